use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tracing::debug;
use wirelink_frame::{encode_message, Decoder, DecoderStats};

use crate::error::{CommandError, Result};

/// How long the polling loop sleeps after an empty-handed read.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

const READ_CHUNK_SIZE: usize = 1024;

/// Drives request/response exchanges over one duplex byte channel.
///
/// A requester owns the channel, one frame [`Decoder`], and the session
/// counter. Session ids start at 1 and wrap mod 65536 skipping 0, so a
/// zeroed/uninitialized id never matches a live request.
///
/// The channel's `read` must be non-blocking or short-blocking (`Ok(0)`
/// meaning closed, `WouldBlock`/`TimedOut` meaning no data yet), or the
/// deadline cannot be observed.
///
/// One requester serves one logical connection with requests issued one at a
/// time — the single reassembly context underneath means two interleaved
/// request pipelines would corrupt each other's messages. Callers needing
/// concurrency use one requester (and one channel) per pipeline.
pub struct Requester<T> {
    channel: T,
    decoder: Decoder,
    next_session: u16,
    poll_interval: Duration,
    wire: BytesMut,
}

impl<T: Read + Write> Requester<T> {
    /// Create a requester with the default poll interval.
    pub fn new(channel: T) -> Self {
        Self::with_poll_interval(channel, DEFAULT_POLL_INTERVAL)
    }

    /// Create a requester with an explicit poll interval.
    pub fn with_poll_interval(channel: T, poll_interval: Duration) -> Self {
        Self {
            channel,
            decoder: Decoder::new(),
            next_session: 1,
            poll_interval,
            wire: BytesMut::new(),
        }
    }

    /// Issue a request under the next session id and wait for its response.
    pub fn request(&mut self, payload: &[u8], timeout: Duration) -> Result<Bytes> {
        let session = self.next_session;
        self.next_session = bump_session(self.next_session);
        self.request_with_session(session, payload, timeout)
    }

    /// Issue a request under an explicit session id.
    pub fn request_with_session(
        &mut self,
        session: u16,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Bytes> {
        self.wire.clear();
        encode_message(session, payload, false, &mut self.wire)?;
        self.write_wire()?;
        debug!(session, len = payload.len(), "request written");

        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match self.channel.read(&mut chunk) {
                Ok(0) => return Err(CommandError::ChannelClosed),
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => 0,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    0
                }
                Err(err) => return Err(CommandError::Io(err)),
            };

            if read > 0 {
                for message in self.decoder.feed(&chunk[..read]) {
                    if message.is_response && message.session == session {
                        debug!(session, len = message.payload.len(), "response matched");
                        return Ok(message.payload);
                    }
                    // Unrelated messages are not queued for later retrieval.
                    debug!(
                        session = message.session,
                        is_response = message.is_response,
                        "discarding unmatched message"
                    );
                }
            }

            if Instant::now() >= deadline {
                return Err(CommandError::Timeout(timeout));
            }
            if read == 0 {
                std::thread::sleep(self.poll_interval);
            }
        }
    }

    /// The session id the next request will use.
    pub fn next_session(&self) -> u16 {
        self.next_session
    }

    /// Decode counters from the underlying frame decoder.
    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &T {
        &self.channel
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.channel
    }

    /// Consume the requester and return the channel.
    pub fn into_inner(self) -> T {
        self.channel
    }

    fn write_wire(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.wire.len() {
            match self.channel.write(&self.wire[offset..]) {
                Ok(0) => return Err(CommandError::ChannelClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(CommandError::Io(err)),
            }
        }
        loop {
            match self.channel.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(CommandError::Io(err)),
            }
        }
    }
}

fn bump_session(session: u16) -> u16 {
    let next = session.wrapping_add(1);
    if next == 0 {
        1
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::os::unix::net::UnixStream;
    use std::thread;

    use super::*;
    use wirelink_frame::Message;

    fn encode(session: u16, payload: &[u8], is_response: bool) -> BytesMut {
        let mut wire = BytesMut::new();
        encode_message(session, payload, is_response, &mut wire).unwrap();
        wire
    }

    fn socket_pair() -> (UnixStream, UnixStream) {
        let (left, right) = UnixStream::pair().unwrap();
        left.set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        right
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        (left, right)
    }

    fn run_device(
        mut stream: UnixStream,
        respond: impl Fn(&Message) -> Vec<BytesMut> + Send + 'static,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut decoder = Decoder::new();
            let mut chunk = [0u8; 512];
            loop {
                let read = match stream.read(&mut chunk) {
                    Ok(0) => return,
                    Ok(n) => n,
                    Err(err)
                        if err.kind() == ErrorKind::WouldBlock
                            || err.kind() == ErrorKind::TimedOut =>
                    {
                        continue;
                    }
                    Err(_) => return,
                };
                for message in decoder.feed(&chunk[..read]) {
                    for wire in respond(&message) {
                        stream.write_all(&wire).unwrap();
                    }
                }
            }
        })
    }

    #[test]
    fn returns_matching_response() {
        let (device_side, client_side) = socket_pair();
        let device = run_device(device_side, |message| {
            vec![encode(message.session, b"reply", true)]
        });

        let mut requester = Requester::new(client_side);
        let response = requester
            .request(b"question", Duration::from_secs(1))
            .unwrap();
        assert_eq!(response.as_ref(), b"reply");

        drop(requester);
        device.join().unwrap();
    }

    #[test]
    fn skips_unrelated_messages() {
        let (device_side, client_side) = socket_pair();
        let device = run_device(device_side, |message| {
            vec![
                // Response under a foreign session.
                encode(message.session.wrapping_add(7), b"foreign", true),
                // Unsolicited non-response traffic.
                encode(message.session, b"not a response", false),
                // The real one.
                encode(message.session, b"real", true),
            ]
        });

        let mut requester = Requester::new(client_side);
        let response = requester.request(b"question", Duration::from_secs(1)).unwrap();
        assert_eq!(response.as_ref(), b"real");

        drop(requester);
        device.join().unwrap();
    }

    #[test]
    fn fragmented_response_reassembles() {
        let big: Vec<u8> = (0..700).map(|i| (i % 255) as u8).collect();
        let reply = big.clone();
        let (device_side, client_side) = socket_pair();
        let device = run_device(device_side, move |message| {
            vec![encode(message.session, &reply, true)]
        });

        let mut requester = Requester::new(client_side);
        let response = requester.request(b"pull", Duration::from_secs(1)).unwrap();
        assert_eq!(response.as_ref(), big.as_slice());

        drop(requester);
        device.join().unwrap();
    }

    #[test]
    fn timeout_when_silent() {
        let (_device_side, client_side) = socket_pair();
        let mut requester = Requester::new(client_side);

        let err = requester
            .request(b"anyone?", Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, CommandError::Timeout(_)));
    }

    #[test]
    fn session_counter_increments_per_request() {
        let (device_side, client_side) = socket_pair();
        let device = run_device(device_side, |message| {
            vec![encode(message.session, b"ok", true)]
        });

        let mut requester = Requester::new(client_side);
        assert_eq!(requester.next_session(), 1);
        requester.request(b"a", Duration::from_secs(1)).unwrap();
        assert_eq!(requester.next_session(), 2);
        requester.request(b"b", Duration::from_secs(1)).unwrap();
        assert_eq!(requester.next_session(), 3);

        drop(requester);
        device.join().unwrap();
    }

    #[test]
    fn session_counter_skips_zero() {
        assert_eq!(bump_session(1), 2);
        assert_eq!(bump_session(65534), 65535);
        assert_eq!(bump_session(65535), 1);
    }

    #[test]
    fn closed_channel_reported() {
        // An exhausted cursor reads Ok(0): closed, not timeout.
        let channel = Cursor::new(Vec::<u8>::new());
        let mut requester = Requester::new(channel);
        let err = requester
            .request(b"x", Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, CommandError::ChannelClosed));
    }

    #[test]
    fn write_retries_on_interrupted_and_would_block() {
        struct FlakyChannel {
            wrote_once: bool,
            blocked_once: bool,
            data: Vec<u8>,
            response: Cursor<Vec<u8>>,
        }

        impl Read for FlakyChannel {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.response.read(buf)
            }
        }

        impl Write for FlakyChannel {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.wrote_once {
                    self.wrote_once = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                if !self.blocked_once {
                    self.blocked_once = true;
                    return Err(std::io::Error::from(ErrorKind::WouldBlock));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let response = encode(1, b"pong", true);
        let channel = FlakyChannel {
            wrote_once: false,
            blocked_once: false,
            data: Vec::new(),
            response: Cursor::new(response.to_vec()),
        };

        let mut requester = Requester::new(channel);
        let reply = requester.request(b"ping", Duration::from_secs(1)).unwrap();
        assert_eq!(reply.as_ref(), b"pong");
        assert!(!requester.get_ref().data.is_empty());
    }

    #[test]
    fn explicit_session_does_not_advance_counter() {
        let (device_side, client_side) = socket_pair();
        let device = run_device(device_side, |message| {
            vec![encode(message.session, b"ok", true)]
        });

        let mut requester = Requester::new(client_side);
        let response = requester
            .request_with_session(500, b"x", Duration::from_secs(1))
            .unwrap();
        assert_eq!(response.as_ref(), b"ok");
        assert_eq!(requester.next_session(), 1);

        drop(requester);
        device.join().unwrap();
    }
}
