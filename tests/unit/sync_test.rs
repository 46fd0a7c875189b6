//! End-to-end refresh cycle tests with a scripted host and capture channel.

use palsync::sync::Phase;
use palsync::{
    Background, Multiplexer, ResetStrategy, SyncConfig, SyncController, SyncErrorKind,
    TermFamily, TermSupport,
};

use crate::helpers::{decode_osc, decode_slot_assignments, CaptureChannel, MockHost};

fn xterm_support(max_colors: u16, reset: ResetStrategy) -> TermSupport {
    TermSupport {
        family: TermFamily::Xterm,
        max_colors,
        multiplexer: Multiplexer::None,
        reset,
    }
}

fn controller(
    max_colors: u16,
    reset: ResetStrategy,
    config: SyncConfig,
) -> (SyncController<CaptureChannel>, crate::helpers::SentLog) {
    let channel = CaptureChannel::new(32 * 1024);
    let log = channel.log();
    let controller = SyncController::new(channel, xterm_support(max_colors, reset), config);
    (controller, log)
}

#[test]
fn base_plus_alias_cycle_commits() {
    let listing = "\
Normal  xxx guifg=#000000 guibg=#ffffff
Aliased xxx links to Normal
";
    let mut host = MockHost::new(listing);
    let (mut ctrl, log) = controller(256, ResetStrategy::DefaultReplay, SyncConfig::default());

    ctrl.refresh(&mut host).unwrap();
    assert_eq!(ctrl.phase(), Phase::Committed);

    // The base style's two colors take the high-end slot and slot 16.
    let base = host.style("Normal").unwrap();
    assert_eq!(base.fg, Some(255));
    assert_eq!(base.bg, Some(16));

    // The alias became a host link, not an attribute copy.
    assert_eq!(host.links, vec![("Aliased".to_string(), "Normal".to_string())]);
    assert!(host.style("Aliased").is_none());

    // Background fixed exactly once, from #ffffff.
    assert_eq!(host.backgrounds, vec![Background::Light]);

    // Exactly one palette flush, then the cursor reset.
    let sent = log.borrow();
    let palette_frames: Vec<_> = sent
        .iter()
        .filter(|f| f.starts_with(b"\x1b]4"))
        .collect();
    assert_eq!(palette_frames.len(), 1);
    assert_eq!(
        decode_slot_assignments(&sent),
        vec![
            (255, "rgb:00/00/00".to_string()),
            (16, "rgb:ff/ff/ff".to_string()),
        ]
    );
    assert_eq!(sent.last().unwrap(), &b"\x1b]112\x07".to_vec());
}

#[test]
fn exhaustion_rolls_back_and_surfaces_the_original_error() {
    // max_colors = 18 leaves two dynamic slots: the base style uses both,
    // the third style's color cannot be allocated.
    let listing = "\
Normal xxx guifg=#000000 guibg=#ffffff
Second xxx guifg=#000000
Third  xxx guifg=#123456
";
    let mut host = MockHost::new(listing);
    let (mut ctrl, log) = controller(18, ResetStrategy::DefaultReplay, SyncConfig::default());

    let err = ctrl.refresh(&mut host).unwrap_err();
    assert_eq!(ctrl.phase(), Phase::RolledBack);
    assert_eq!(err.origin(), "palette");
    assert!(matches!(
        err.kind(),
        SyncErrorKind::OutOfColors { max_colors: 18 }
    ));

    // The rollback replayed the default palette and reset the cursor.
    let sent = log.borrow();
    let replayed = decode_slot_assignments(&sent);
    assert!(replayed.contains(&(16, "rgb:00/00/00".to_string())));
    assert!(replayed.contains(&(17, "rgb:00/00/5f".to_string())));
    assert_eq!(sent.last().unwrap(), &b"\x1b]112\x07".to_vec());
}

#[test]
fn native_reset_rollback_is_one_sequence() {
    let listing = "\
Normal xxx guifg=#000000 guibg=#ffffff
Third  xxx guifg=#123456
";
    let mut host = MockHost::new(listing);
    let (mut ctrl, log) = controller(18, ResetStrategy::Capability, SyncConfig::default());

    // Base takes both slots; Third exhausts the range.
    let second = "Second xxx guifg=#222222\n";
    host.listing.push_str(second);
    let err = ctrl.refresh(&mut host).unwrap_err();
    assert!(matches!(err.kind(), SyncErrorKind::OutOfColors { .. }));

    let sent = log.borrow();
    assert!(sent.contains(&b"\x1b]104\x07".to_vec()));
}

#[test]
fn gui_only_styles_are_skipped() {
    let listing = "\
Normal    xxx guifg=#ffffff guibg=#000000
Cursor    xxx guibg=#ff0000
Menu      xxx guifg=#00ff00
Scrollbar xxx guibg=#0000ff
Tooltip   xxx guifg=#ffff00
";
    let mut host = MockHost::new(listing);
    let (mut ctrl, _log) = controller(256, ResetStrategy::DefaultReplay, SyncConfig::default());
    ctrl.refresh(&mut host).unwrap();

    let applied: Vec<&str> = host.applied.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(applied, ["Normal"]);
}

#[test]
fn cursor_style_programs_the_cursor_color() {
    let listing = "\
Normal xxx guifg=#ffffff guibg=#000000
Cursor xxx guibg=#ff8800
";
    let mut host = MockHost::new(listing);
    let (mut ctrl, log) = controller(256, ResetStrategy::DefaultReplay, SyncConfig::default());
    ctrl.refresh(&mut host).unwrap();

    let sent = log.borrow();
    let cursor = sent.last().unwrap();
    let oscs = decode_osc(cursor);
    assert_eq!(oscs.len(), 1);
    assert_eq!(oscs[0].selector, "12");
    assert_eq!(oscs[0].params, vec!["rgb:ff/88/00".to_string()]);
}

#[test]
fn configured_cursor_reset_is_used() {
    let listing = "Normal xxx guifg=#ffffff guibg=#000000\n";
    let config = SyncConfig {
        cursor_reset: Some("\x1b]112;custom\x07".to_string()),
        ..Default::default()
    };
    let mut host = MockHost::new(listing);
    let (mut ctrl, log) = controller(256, ResetStrategy::DefaultReplay, config);
    ctrl.refresh(&mut host).unwrap();
    assert_eq!(
        log.borrow().last().unwrap(),
        &b"\x1b]112;custom\x07".to_vec()
    );
}

#[test]
fn blacklisted_styles_are_left_untouched() {
    let listing = "\
Normal   xxx guifg=#ffffff guibg=#000000
PmenuSel xxx guifg=#112233
Comment  xxx guifg=#445566
";
    let config = SyncConfig {
        blacklist: Some("^Pmenu".to_string()),
        ..Default::default()
    };
    let mut host = MockHost::new(listing);
    let (mut ctrl, _log) = controller(256, ResetStrategy::DefaultReplay, config);
    ctrl.refresh(&mut host).unwrap();

    let applied: Vec<&str> = host.applied.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(applied, ["Normal", "Comment"]);
}

#[test]
fn host_failure_rolls_back_with_host_origin() {
    let listing = "\
Normal  xxx guifg=#ffffff guibg=#000000
Comment xxx guifg=#445566
";
    let mut host = MockHost::new(listing);
    host.fail_on = Some("Comment".to_string());
    let (mut ctrl, log) = controller(256, ResetStrategy::Capability, SyncConfig::default());

    let err = ctrl.refresh(&mut host).unwrap_err();
    assert_eq!(ctrl.phase(), Phase::RolledBack);
    assert_eq!(err.origin(), "host");
    assert!(sent_contains(&log.borrow(), b"\x1b]104\x07"));
}

#[test]
fn base_style_without_colors_uses_fallbacks_and_commits() {
    let listing = "Normal xxx cleared\n";
    let mut host = MockHost::new(listing);
    let (mut ctrl, _log) = controller(256, ResetStrategy::DefaultReplay, SyncConfig::default());
    ctrl.refresh(&mut host).unwrap();

    // Fallback white-on-black: fg allocated first from the high end.
    let base = host.style("Normal").unwrap();
    assert_eq!(base.fg, Some(255));
    assert_eq!(base.bg, Some(16));
    assert_eq!(host.backgrounds, vec![Background::Dark]);
}

#[test]
fn shared_colors_share_slots_across_styles() {
    let listing = "\
Normal  xxx guifg=#aaaaaa guibg=#111111
Comment xxx guifg=#aaaaaa
Keyword xxx guifg=#aaaaaa guibg=#111111
";
    let mut host = MockHost::new(listing);
    let (mut ctrl, _log) = controller(256, ResetStrategy::DefaultReplay, SyncConfig::default());
    ctrl.refresh(&mut host).unwrap();

    let normal = *host.style("Normal").unwrap();
    let comment = *host.style("Comment").unwrap();
    let keyword = *host.style("Keyword").unwrap();
    assert_eq!(normal.fg, comment.fg);
    assert_eq!(normal.fg, keyword.fg);
    assert_eq!(normal.bg, keyword.bg);
}

fn sent_contains(sent: &[Vec<u8>], needle: &[u8]) -> bool {
    sent.iter().any(|frame| frame == needle)
}
