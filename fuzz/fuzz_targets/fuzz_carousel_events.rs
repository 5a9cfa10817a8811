#![no_main]

use arbitrary::Arbitrary;
use glide_core::{
    Carousel, CarouselConfig, FrameToken, HostCommand, InputEvent, InputModalities, IntervalToken,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    MouseDown(i16),
    MouseMove(i16),
    MouseUp(i16),
    TouchStart(u8, i16),
    TouchMove(u8, i16),
    TouchEnd(u8, i16),
    TouchCancel(u8, i16),
    Tick,
    Frame,
    Resize(u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    slides: u8,
    width: u16,
    interval_ms: u16,
    ops: Vec<Op>,
}

#[derive(Default)]
struct Ledger {
    frame: Option<FrameToken>,
    interval: Option<IntervalToken>,
}

impl Ledger {
    fn track(&mut self, commands: &[HostCommand]) {
        for command in commands {
            match *command {
                HostCommand::RequestFrame(token) => self.frame = Some(token),
                HostCommand::CancelFrame(_) => self.frame = None,
                HostCommand::ArmInterval { token, .. } => self.interval = Some(token),
                HostCommand::ClearInterval(_) => self.interval = None,
                _ => {}
            }
        }
    }
}

fuzz_target!(|input: Input| {
    let config = CarouselConfig {
        auto_slide_interval_ms: f64::from(input.interval_ms),
        ..CarouselConfig::default()
    };
    let Some(mut carousel) = Carousel::new(usize::from(input.slides % 16), config) else {
        return;
    };
    let count = carousel.slide_count();
    let mut ledger = Ledger::default();
    ledger.track(&carousel.mount(f64::from(input.width)).commands);

    for op in input.ops.iter().take(512) {
        let event = match *op {
            Op::MouseDown(x) => InputEvent::mouse_down(f64::from(x)),
            Op::MouseMove(x) => InputEvent::mouse_move(f64::from(x)),
            Op::MouseUp(x) => InputEvent::mouse_up(f64::from(x)),
            Op::TouchStart(id, x) => InputEvent::touch_start(u32::from(id % 4), f64::from(x)),
            Op::TouchMove(id, x) => InputEvent::touch_move(u32::from(id % 4), f64::from(x)),
            Op::TouchEnd(id, x) => InputEvent::touch_end(u32::from(id % 4), f64::from(x)),
            Op::TouchCancel(id, x) => InputEvent::touch_cancel(u32::from(id % 4), f64::from(x)),
            Op::Tick => {
                if let Some(token) = ledger.interval {
                    ledger.track(&carousel.on_interval(token).commands);
                }
                continue;
            }
            Op::Frame => {
                if let Some(token) = ledger.frame.take() {
                    let _ = carousel.on_frame(token);
                }
                continue;
            }
            Op::Resize(width) => {
                ledger.track(&carousel.set_viewport_width(f64::from(width)).commands);
                continue;
            }
        };
        ledger.track(&carousel.handle_input(&event).commands);

        assert!(carousel.active_slide() < count, "active slide out of range");
        assert!(carousel.live_offset().is_finite(), "live offset not finite");
        if !carousel.is_dragging() {
            assert_eq!(carousel.live_offset(), 0.0, "offset kept after release");
        }
        assert_eq!(
            carousel.is_dragging(),
            !carousel.global_listeners().is_empty(),
            "global listeners out of step with the drag"
        );
    }

    ledger.track(&carousel.dispose().commands);
    assert!(carousel.bound_triggers().is_empty());
    assert_eq!(carousel.global_listeners(), InputModalities::NONE);
    assert!(ledger.frame.is_none(), "frame still pending after dispose");
    assert!(ledger.interval.is_none(), "interval still armed after dispose");
});
