//! Unit tests for escape-sequence channels and multiplexer framing.

use palsync::{DirectChannel, ScreenChannel, SyncErrorKind, TmuxChannel, TtyChannel};

use crate::helpers::CaptureChannel;

#[test]
fn direct_channel_writes_through_to_the_device() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut chan = DirectChannel::open_path(file.path()).unwrap();
    chan.send_code(b"\x1b]4;16;rgb:aa/bb/cc\x07").unwrap();
    assert_eq!(
        std::fs::read(file.path()).unwrap(),
        b"\x1b]4;16;rgb:aa/bb/cc\x07"
    );
}

#[test]
fn screen_wraps_in_a_device_control_string() {
    let capture = CaptureChannel::new(4096);
    let log = capture.log();
    let mut chan = ScreenChannel::new(Box::new(capture));
    chan.send_code(b"\x1b]112\x07").unwrap();
    assert_eq!(log.borrow()[0], b"\x1bP\x1b]112\x07\x1b\\".to_vec());
}

#[test]
fn tmux_doubles_escape_bytes_in_the_payload() {
    let capture = CaptureChannel::new(4096);
    let log = capture.log();
    let mut chan = TmuxChannel::new(Box::new(capture));
    chan.send_code(b"\x1b]104\x07").unwrap();
    let frame = log.borrow()[0].clone();
    assert!(frame.starts_with(b"\x1bPtmux;"));
    assert!(frame.ends_with(b"\x1b\\"));
    // The single payload ESC became two.
    let payload = &frame[7..frame.len() - 2];
    assert_eq!(payload, b"\x1b\x1b]104\x07");
}

#[test]
fn tmux_respects_its_fixed_input_ceiling() {
    let chan = TmuxChannel::new(Box::new(CaptureChannel::new(1 << 20)));
    assert_eq!(chan.code_max(), 250);
}

#[test]
fn budgets_shrink_through_nested_wrappers() {
    // tmux inside screen inside a direct-sized channel: each layer pays
    // its own framing overhead.
    let screen = ScreenChannel::new(Box::new(CaptureChannel::new(32 * 1024)));
    let screen_budget = screen.code_max();
    assert_eq!(screen_budget, 252);
    let tmux = TmuxChannel::new(Box::new(screen));
    assert_eq!(tmux.code_max(), (252 - 9) / 2);
}

#[test]
fn over_budget_payloads_are_rejected_not_split() {
    let mut chan = ScreenChannel::new(Box::new(CaptureChannel::new(4096)));
    let payload = vec![b'a'; chan.code_max() + 1];
    let err = chan.send_code(&payload).unwrap_err();
    assert_eq!(err.origin(), "channel");
    assert!(matches!(err.kind(), SyncErrorKind::CodeTooLong { .. }));
}

#[test]
fn wrapped_worst_case_payload_fits_the_inner_channel() {
    let capture = CaptureChannel::new(529);
    let log = capture.log();
    let mut chan = TmuxChannel::new(Box::new(capture));
    let budget = chan.code_max();
    assert_eq!(budget, 250);
    chan.send_code(&vec![0x1bu8; budget]).unwrap();
    assert_eq!(log.borrow()[0].len(), 7 + 2 * budget + 2);
}
