//! End-to-end command exchanges against a scripted device double.
//!
//! The double runs the device side of the protocol on a thread: reassemble
//! inbound request messages, dispatch on the command id, frame the response
//! back under the same session. It mirrors the firmware's command dispatch
//! closely enough to exercise the whole client stack, fragmentation
//! included.

use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::thread;
use std::time::Duration;

use bytes::BytesMut;
use wirelink_command::envelope::{pack_response, parse_request, Status};
use wirelink_command::{ids, CommandClient, CommandError};
use wirelink_frame::{encode_message, Decoder};

type Dispatch = fn(u16, &[u8]) -> Option<(Status, Vec<u8>)>;

fn spawn_device(mut stream: UnixStream, dispatch: Dispatch) -> thread::JoinHandle<()> {
    stream
        .set_read_timeout(Some(Duration::from_millis(10)))
        .unwrap();
    thread::spawn(move || {
        let mut decoder = Decoder::new();
        let mut chunk = [0u8; 512];
        loop {
            let read = match stream.read(&mut chunk) {
                Ok(0) => return,
                Ok(n) => n,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(_) => return,
            };
            for message in decoder.feed(&chunk[..read]) {
                if message.is_response {
                    continue;
                }
                let (cmd_id, payload) = parse_request(&message.payload).unwrap();
                let Some((status, data)) = dispatch(cmd_id, payload) else {
                    continue; // scripted silence
                };
                let response = pack_response(cmd_id, status, &data);
                let mut wire = BytesMut::new();
                encode_message(message.session, &response, true, &mut wire).unwrap();
                if stream.write_all(&wire).is_err() {
                    return;
                }
            }
        }
    })
}

fn firmware_dispatch(cmd_id: u16, payload: &[u8]) -> Option<(Status, Vec<u8>)> {
    match cmd_id {
        ids::FW_VERSION => Some((Status::OK, b"1a2b3c4d5e6f".to_vec())),
        ids::UPTIME => {
            let mut out = Vec::with_capacity(8);
            out.extend_from_slice(&123_456u32.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            Some((Status::OK, out))
        }
        ids::FLASH_READ => {
            if payload.len() != 6 {
                return Some((Status::INVALID, Vec::new()));
            }
            let addr = u32::from_le_bytes(payload[0..4].try_into().unwrap());
            let len = u16::from_le_bytes(payload[4..6].try_into().unwrap());
            let data = (0..len).map(|i| (addr as u16).wrapping_add(i) as u8).collect();
            Some((Status::OK, data))
        }
        ids::REBOOT => Some((Status::OK, Vec::new())),
        ids::ECHO => Some((Status::OK, payload.to_vec())),
        _ => Some((Status::UNSUPPORTED, Vec::new())),
    }
}

fn client_pair(dispatch: Dispatch) -> (CommandClient<UnixStream>, thread::JoinHandle<()>) {
    let (device_side, client_side) = UnixStream::pair().unwrap();
    client_side
        .set_read_timeout(Some(Duration::from_millis(10)))
        .unwrap();
    let device = spawn_device(device_side, dispatch);
    (CommandClient::new(client_side), device)
}

#[test]
fn echo_small() {
    let (mut client, device) = client_pair(firmware_dispatch);
    let payload: Vec<u8> = (0..64).collect();
    let got = client.echo(&payload).unwrap();
    assert_eq!(got.as_ref(), payload.as_slice());
    drop(client);
    device.join().unwrap();
}

#[test]
fn echo_forces_fragmentation_both_ways() {
    let (mut client, device) = client_pair(firmware_dispatch);
    let payload: Vec<u8> = (0..300).map(|i| (i & 0xFF) as u8).collect();
    let got = client.echo(&payload).unwrap();
    assert_eq!(got.as_ref(), payload.as_slice());
    drop(client);
    device.join().unwrap();
}

#[test]
fn echo_burst_advances_sessions() {
    let (mut client, device) = client_pair(firmware_dispatch);
    for i in 0..20u32 {
        let payload: Vec<u8> = (0..(i * 11 % 200 + 1)).map(|j| (i + j) as u8).collect();
        let got = client.echo(&payload).unwrap();
        assert_eq!(got.as_ref(), payload.as_slice(), "round {i}");
    }
    drop(client);
    device.join().unwrap();
}

#[test]
fn firmware_version_string() {
    let (mut client, device) = client_pair(firmware_dispatch);
    assert_eq!(client.firmware_version().unwrap(), "1a2b3c4d5e6f");
    drop(client);
    device.join().unwrap();
}

#[test]
fn uptime_value() {
    let (mut client, device) = client_pair(firmware_dispatch);
    assert_eq!(client.uptime_ms().unwrap(), 123_456);
    drop(client);
    device.join().unwrap();
}

#[test]
fn uptime_shape_violation() {
    fn short_uptime(cmd_id: u16, _payload: &[u8]) -> Option<(Status, Vec<u8>)> {
        match cmd_id {
            ids::UPTIME => Some((Status::OK, vec![1, 2, 3])),
            _ => Some((Status::UNSUPPORTED, Vec::new())),
        }
    }

    let (mut client, device) = client_pair(short_uptime);
    let err = client.uptime_ms().unwrap_err();
    assert!(matches!(
        err,
        CommandError::UnexpectedShape {
            cmd_id: ids::UPTIME,
            ..
        }
    ));
    drop(client);
    device.join().unwrap();
}

#[test]
fn flash_read_returns_requested_length() {
    let (mut client, device) = client_pair(firmware_dispatch);
    let data = client.flash_read(0x1000, 32).unwrap();
    assert_eq!(data.len(), 32);
    // Repeatable.
    let again = client.flash_read(0x1000, 32).unwrap();
    assert_eq!(data, again);
    drop(client);
    device.join().unwrap();
}

#[test]
fn flash_read_argument_validation() {
    let (mut client, device) = client_pair(firmware_dispatch);
    assert!(matches!(
        client.flash_read(0, 0).unwrap_err(),
        CommandError::InvalidArgument(_)
    ));
    assert!(matches!(
        client.flash_read(0, 257).unwrap_err(),
        CommandError::InvalidArgument(_)
    ));
    drop(client);
    device.join().unwrap();
}

#[test]
fn flash_read_length_mismatch_is_shape_error() {
    fn stingy_flash(cmd_id: u16, _payload: &[u8]) -> Option<(Status, Vec<u8>)> {
        match cmd_id {
            ids::FLASH_READ => Some((Status::OK, vec![0xEE; 4])),
            _ => Some((Status::UNSUPPORTED, Vec::new())),
        }
    }

    let (mut client, device) = client_pair(stingy_flash);
    let err = client.flash_read(0, 16).unwrap_err();
    assert!(matches!(
        err,
        CommandError::UnexpectedShape {
            cmd_id: ids::FLASH_READ,
            ..
        }
    ));
    drop(client);
    device.join().unwrap();
}

#[test]
fn unknown_command_maps_to_device_error() {
    let (mut client, device) = client_pair(firmware_dispatch);
    let err = client.execute(0x7777, b"").unwrap_err();
    match err {
        CommandError::Device { cmd_id, status } => {
            assert_eq!(cmd_id, 0x7777);
            assert_eq!(status, Status::UNSUPPORTED);
        }
        other => panic!("expected device error, got {other:?}"),
    }
    drop(client);
    device.join().unwrap();
}

#[test]
fn reboot_acknowledged() {
    let (mut client, device) = client_pair(firmware_dispatch);
    client.reboot().unwrap();
    drop(client);
    device.join().unwrap();
}

#[test]
fn reboot_timeout_when_device_resets_first() {
    fn mute_reboot(cmd_id: u16, payload: &[u8]) -> Option<(Status, Vec<u8>)> {
        match cmd_id {
            ids::REBOOT => None,
            _ => firmware_dispatch(cmd_id, payload),
        }
    }

    let (mut client, device) = client_pair(mute_reboot);
    let err = client.reboot().unwrap_err();
    assert!(matches!(err, CommandError::Timeout(_)));
    drop(client);
    device.join().unwrap();
}
