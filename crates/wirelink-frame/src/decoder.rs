use bytes::BytesMut;
use tracing::{debug, trace};

use crate::codec::{
    Message, CRC_LEN, FLAG_END, FLAG_RESPONSE, FLAG_START, HEADER_LEN, MAX_FRAGMENTS, MAX_MESSAGE,
    MAX_PAYLOAD, SYNC0, SYNC1, VERSION,
};

/// Running counters from the decoder.
///
/// Framing errors are never surfaced as values — these counters are the only
/// externally visible trace of dropped input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames received with a valid CRC.
    pub frames_ok: u64,
    /// Frames dropped due to CRC mismatch.
    pub frames_crc_err: u64,
    /// Frames abandoned for structural reasons (bad length, version, count).
    pub frames_resync: u64,
    /// Fully reassembled messages delivered.
    pub messages_ok: u64,
    /// Fragments or in-progress messages dropped by reassembly.
    pub messages_dropped: u64,
}

enum ParseState {
    Sync0,
    Sync1,
    Header,
    Payload,
    Crc,
}

struct Reassembly {
    session: u16,
    next_index: u16,
    frag_count: u16,
    is_response: bool,
    buf: BytesMut,
}

/// Byte-at-a-time frame parser and message reassembler.
///
/// Feed arbitrary chunks of the inbound stream; complete messages come back
/// as they reassemble. Corrupt or out-of-sequence input is dropped silently
/// and the parser relocks on the next sync sequence.
///
/// A decoder tracks a single reassembly context. Fragments of a second
/// session arriving while a message is mid-reassembly are dropped, so one
/// decoder serves one logical connection with requests serialized — never
/// share an instance across concurrently pending requests.
pub struct Decoder {
    state: ParseState,
    header: [u8; HEADER_LEN],
    crc: [u8; CRC_LEN],
    have: usize,
    payload: Vec<u8>,
    payload_len: usize,
    reassembly: Option<Reassembly>,
    stats: DecoderStats,
}

impl Decoder {
    /// Create a decoder locked to the sync-scan state.
    pub fn new() -> Self {
        Self {
            state: ParseState::Sync0,
            header: [0; HEADER_LEN],
            crc: [0; CRC_LEN],
            have: 0,
            payload: Vec::with_capacity(MAX_PAYLOAD),
            payload_len: 0,
            reassembly: None,
            stats: DecoderStats::default(),
        }
    }

    /// Consume inbound bytes, returning every message that completed.
    ///
    /// Chunk boundaries are irrelevant: one byte per call and the whole
    /// stream in one call produce identical output.
    pub fn feed(&mut self, input: &[u8]) -> Vec<Message> {
        let mut out = Vec::new();
        for &byte in input {
            self.step(byte, &mut out);
        }
        out
    }

    /// Snapshot of the running counters.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop parser and reassembly state, keeping the counters.
    pub fn reset(&mut self) {
        self.state = ParseState::Sync0;
        self.have = 0;
        self.payload.clear();
        self.reassembly = None;
    }

    fn step(&mut self, byte: u8, out: &mut Vec<Message>) {
        match self.state {
            ParseState::Sync0 => {
                if byte == SYNC0 {
                    self.state = ParseState::Sync1;
                }
            }
            ParseState::Sync1 => {
                if byte == SYNC1 {
                    self.state = ParseState::Header;
                    self.have = 0;
                } else {
                    // A stray sync0 inside payload data lands here and the
                    // scan simply continues.
                    self.state = ParseState::Sync0;
                }
            }
            ParseState::Header => {
                self.header[self.have] = byte;
                self.have += 1;
                if self.have == HEADER_LEN {
                    let declared = u16::from_le_bytes([self.header[8], self.header[9]]) as usize;
                    if declared > MAX_PAYLOAD {
                        trace!(declared, "payload length over limit, resyncing");
                        self.stats.frames_resync += 1;
                        self.state = ParseState::Sync0;
                        return;
                    }
                    self.payload_len = declared;
                    self.payload.clear();
                    self.have = 0;
                    self.state = if declared == 0 {
                        ParseState::Crc
                    } else {
                        ParseState::Payload
                    };
                }
            }
            ParseState::Payload => {
                self.payload.push(byte);
                if self.payload.len() == self.payload_len {
                    self.have = 0;
                    self.state = ParseState::Crc;
                }
            }
            ParseState::Crc => {
                self.crc[self.have] = byte;
                self.have += 1;
                if self.have == CRC_LEN {
                    self.finish_frame(out);
                    // One frame per pass, whatever the outcome.
                    self.state = ParseState::Sync0;
                }
            }
        }
    }

    fn finish_frame(&mut self, out: &mut Vec<Message>) {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.header);
        hasher.update(&self.payload);
        let calc = hasher.finalize();
        let got = u32::from_le_bytes(self.crc);
        if calc != got {
            trace!(calc, got, "CRC mismatch, frame dropped");
            self.stats.frames_crc_err += 1;
            return;
        }
        self.stats.frames_ok += 1;

        let version = self.header[0];
        let flags = self.header[1];
        let session = u16::from_le_bytes([self.header[2], self.header[3]]);
        let frag_index = u16::from_le_bytes([self.header[4], self.header[5]]);
        let frag_count = u16::from_le_bytes([self.header[6], self.header[7]]);

        if version != VERSION {
            debug!(version, "unrecognized version, frame dropped");
            self.stats.frames_resync += 1;
            return;
        }
        if frag_count == 0 || frag_count as usize > MAX_FRAGMENTS {
            debug!(frag_count, "fragment count out of range, frame dropped");
            self.stats.frames_resync += 1;
            return;
        }

        if flags & FLAG_START != 0 {
            // A START always opens a fresh context, abandoning any message
            // that was mid-reassembly.
            self.reassembly = Some(Reassembly {
                session,
                next_index: 0,
                frag_count,
                is_response: flags & FLAG_RESPONSE != 0,
                buf: BytesMut::new(),
            });
        }

        let Some(re) = self.reassembly.as_mut() else {
            debug!(session, frag_index, "fragment without message in progress");
            self.stats.messages_dropped += 1;
            return;
        };

        if session != re.session || frag_index != re.next_index {
            // Out-of-sequence fragment: drop it, keep the active context.
            debug!(
                session,
                frag_index,
                active_session = re.session,
                expected_index = re.next_index,
                "out-of-sequence fragment dropped"
            );
            self.stats.messages_dropped += 1;
            return;
        }

        if re.buf.len() + self.payload.len() > MAX_MESSAGE {
            debug!(session, "reassembly limit exceeded, message dropped");
            self.stats.messages_dropped += 1;
            self.reassembly = None;
            return;
        }
        re.buf.extend_from_slice(&self.payload);
        re.next_index += 1;
        let overrun = re.next_index > re.frag_count;

        if flags & FLAG_END != 0 {
            let re = self.reassembly.take().unwrap();
            self.stats.messages_ok += 1;
            trace!(
                session = re.session,
                len = re.buf.len(),
                is_response = re.is_response,
                "message reassembled"
            );
            out.push(Message {
                session: re.session,
                payload: re.buf.freeze(),
                is_response: re.is_response,
            });
        } else if overrun {
            // More fragments than declared and still no END.
            debug!(session, "fragment overrun, message dropped");
            self.stats.messages_dropped += 1;
            self.reassembly = None;
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
