//! The command layer over a BLE-style bridged transport.
//!
//! A BLE link has no stream socket: inbound bytes arrive as ~20-byte
//! notification chunks pushed from another thread, outbound bytes go through
//! a characteristic writer. The bridge contract is a `NotifyBuffer` for the
//! inbound side and a `Duplex` joining it with the writer — the client stack
//! runs over it unmodified.

use std::io::{ErrorKind, Read, Write};
use std::thread;

use bytes::BytesMut;
use wirelink_channel::{Duplex, NotifyBuffer};
use wirelink_command::envelope::{pack_response, parse_request, Status};
use wirelink_command::{ids, CommandClient};
use wirelink_frame::{encode_message, Decoder};

const MTU: usize = 20;

/// Client-side write half: chunks outbound bytes to the BLE MTU and hands
/// them to the device thread, the way a GATT write would.
struct GattWriter {
    device_inbound: NotifyBuffer,
}

impl Write for GattWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        for chunk in buf.chunks(MTU) {
            self.device_inbound.push(chunk);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn spawn_device(
    mut device_rx: NotifyBuffer,
    notify_tx: NotifyBuffer,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut decoder = Decoder::new();
        let mut chunk = [0u8; 64];
        loop {
            let read = match device_rx.read(&mut chunk) {
                Ok(0) => return,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(_) => return,
            };
            for message in decoder.feed(&chunk[..read]) {
                let (cmd_id, payload) = parse_request(&message.payload).unwrap();
                let (status, data) = match cmd_id {
                    ids::ECHO => (Status::OK, payload.to_vec()),
                    ids::FW_VERSION => (Status::OK, b"feedc0ffee12".to_vec()),
                    _ => (Status::UNSUPPORTED, Vec::new()),
                };
                let response = pack_response(cmd_id, status, &data);
                let mut wire = BytesMut::new();
                encode_message(message.session, &response, true, &mut wire).unwrap();
                // Notifications arrive in MTU-sized slices.
                for slice in wire.chunks(MTU) {
                    notify_tx.push(slice);
                }
            }
        }
    })
}

#[test]
fn echo_over_chunked_notifications() {
    let device_inbound = NotifyBuffer::new();
    let client_inbound = NotifyBuffer::new();
    let device = spawn_device(device_inbound.clone(), client_inbound.clone());

    let channel = Duplex::new(
        client_inbound,
        GattWriter {
            device_inbound: device_inbound.clone(),
        },
    );
    let mut client = CommandClient::new(channel);

    // Big enough to fragment at the frame layer on top of MTU chunking.
    let payload: Vec<u8> = (0..200u16).map(|i| (i & 0xFF) as u8).collect();
    let got = client.echo(&payload).unwrap();
    assert_eq!(got.as_ref(), payload.as_slice());

    device_inbound.close();
    device.join().unwrap();
}

#[test]
fn typed_command_over_bridge() {
    let device_inbound = NotifyBuffer::new();
    let client_inbound = NotifyBuffer::new();
    let device = spawn_device(device_inbound.clone(), client_inbound.clone());

    let channel = Duplex::new(
        client_inbound,
        GattWriter {
            device_inbound: device_inbound.clone(),
        },
    );
    let mut client = CommandClient::new(channel);

    assert_eq!(client.firmware_version().unwrap(), "feedc0ffee12");

    device_inbound.close();
    device.join().unwrap();
}
