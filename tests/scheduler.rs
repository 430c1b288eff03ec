mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use embassy_time::{Duration, Instant};
    use strand_animator::buffer::{ChannelOrder, PixelSink, SinkError};
    use strand_animator::color::{BLACK, BLUE, GREEN, RED, Rgb, WHITE};
    use strand_animator::composition::{Composition, Sequence};
    use strand_animator::config::{ConfigError, EngineConfig};
    use strand_animator::control::{ControlChannel, ControlEvent};
    use strand_animator::effect::{
        BlinkEffect, BoundEffect, CometColor, CometEffect, EffectSlot, PulseEffect, SolidEffect,
    };
    use strand_animator::input::InputDevices;
    use strand_animator::mode::{AlertCause, ModeKind};
    use strand_animator::pixel_map::PixelMap;
    use strand_animator::scheduler::{FrameScheduler, ModeCompositions};

    /// Records pushed frames through a shared handle; can be told to
    /// fail the next `n` pushes.
    #[derive(Clone, Default)]
    struct TestSink {
        frames: Rc<RefCell<Vec<Vec<u32>>>>,
        fail_next: Rc<Cell<usize>>,
    }

    impl PixelSink for TestSink {
        fn push(&mut self, frame: &[u32]) -> Result<(), SinkError> {
            let remaining = self.fail_next.get();
            if remaining > 0 {
                self.fail_next.set(remaining - 1);
                return Err(SinkError::Timeout);
            }
            self.frames.borrow_mut().push(frame.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct TestDevices {
        buttons: u8,
        accel: Option<[f32; 3]>,
    }

    impl InputDevices for TestDevices {
        fn poll_buttons(&mut self) -> Option<u8> {
            Some(self.buttons)
        }

        fn read_accel(&mut self) -> Option<[f32; 3]> {
            self.accel
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            // Identity gamma keeps expected frames easy to state.
            gamma: 1.0,
            frame_budget: Duration::from_ticks(0),
            tick_delta_max: Duration::from_secs(10),
            active_threshold: 2.0,
            alert_threshold: 5.0,
            alert_duration: Duration::from_secs(2),
            ..EngineConfig::default()
        }
    }

    fn solid<'a>(color: Rgb, map: PixelMap) -> Composition<'a> {
        Composition::Effect(BoundEffect::new(EffectSlot::Solid(SolidEffect::new(color)), map))
    }

    fn last_frame(sink: &TestSink) -> Vec<Rgb> {
        sink.frames
            .borrow()
            .last()
            .expect("nothing presented")
            .iter()
            .map(|word| ChannelOrder::Grb.decode(*word))
            .collect()
    }

    #[test]
    fn test_power_on_and_off() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let compositions = ModeCompositions::idle_only(solid(RED, PixelMap::identity(4)));
        let mut engine = FrameScheduler::<_, _, 4, 8>::new(
            &config(),
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        engine.tick(Instant::from_millis(0));
        assert_eq!(engine.mode(), ModeKind::Off);
        assert!(last_frame(&sink).iter().all(|px| *px == BLACK));

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();
        engine.tick(Instant::from_millis(16));
        assert_eq!(engine.mode(), ModeKind::Idle);
        assert!(last_frame(&sink).iter().all(|px| *px == RED));

        channel.sender().try_send(ControlEvent::PowerOff).unwrap();
        engine.tick(Instant::from_millis(32));
        assert_eq!(engine.mode(), ModeKind::Off);
        assert!(last_frame(&sink).iter().all(|px| *px == BLACK));
    }

    #[test]
    fn test_rejects_invalid_configs() {
        let make = |config: &EngineConfig| {
            FrameScheduler::<TestSink, TestDevices, 4, 8>::new(
                config,
                ModeCompositions::idle_only(solid(RED, PixelMap::identity(4))),
                TestSink::default(),
                TestDevices::default(),
                None,
            )
        };

        let Err(err) = make(&EngineConfig {
            gamma: -1.0,
            ..config()
        }) else {
            panic!("invalid gamma accepted");
        };
        assert_eq!(err, ConfigError::InvalidGamma(-1.0));

        let Err(err) = make(&EngineConfig {
            active_threshold: 5.0,
            alert_threshold: 2.0,
            ..config()
        }) else {
            panic!("inverted thresholds accepted");
        };
        assert_eq!(err, ConfigError::AlertBelowActive);

        let Err(err) = FrameScheduler::<TestSink, TestDevices, 0, 8>::new(
            &config(),
            ModeCompositions::idle_only(solid(RED, PixelMap::identity(0))),
            TestSink::default(),
            TestDevices::default(),
            None,
        ) else {
            panic!("zero pixels accepted");
        };
        assert_eq!(err, ConfigError::ZeroPixels);
    }

    #[test]
    fn test_pulse_breathes_on_schedule() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let pulse = PulseEffect::new(Rgb::new(200, 30, 0), Duration::from_secs(2), 0.2, 1.0);
        let compositions = ModeCompositions::idle_only(Composition::Effect(BoundEffect::new(
            EffectSlot::Pulse(pulse),
            PixelMap::identity(4),
        )));
        let mut engine = FrameScheduler::<_, _, 4, 8>::new(
            &config(),
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();

        // Phase zero: midway between the configured extremes.
        engine.tick(Instant::from_millis(0));
        assert!(last_frame(&sink)[0].r.abs_diff(120) <= 2);

        // Quarter period: full brightness.
        engine.tick(Instant::from_millis(500));
        assert!(last_frame(&sink)[0].r >= 198);

        // Three quarters: the configured minimum.
        engine.tick(Instant::from_millis(1_500));
        assert!(last_frame(&sink)[0].r.abs_diff(40) <= 2);
    }

    #[test]
    fn test_button_steps_idle_sequence() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let map = PixelMap::identity(4);
        let mut children = [solid(RED, map), solid(GREEN, map), solid(BLUE, map)];
        let compositions =
            ModeCompositions::idle_only(Composition::Sequence(Sequence::new(&mut children)));
        let mut engine = FrameScheduler::<_, _, 4, 8>::new(
            &EngineConfig {
                next_button: Some(1),
                ..config()
            },
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();
        engine.tick(Instant::from_millis(0));
        assert_eq!(last_frame(&sink)[0], RED);

        let mut ms = 0;
        let mut press = |engine: &mut FrameScheduler<'_, TestSink, TestDevices, 4, 8>| {
            engine.devices_mut().buttons = 0b10;
            engine.tick(Instant::from_millis(ms + 20));
            // Debounce settles on the second sample; the sequence
            // advances within the same frame.
            engine.tick(Instant::from_millis(ms + 40));
            engine.devices_mut().buttons = 0;
            engine.tick(Instant::from_millis(ms + 60));
            engine.tick(Instant::from_millis(ms + 80));
            ms += 80;
        };

        press(&mut engine);
        assert_eq!(last_frame(&sink)[0], GREEN);
        press(&mut engine);
        assert_eq!(last_frame(&sink)[0], BLUE);
        press(&mut engine);
        assert_eq!(last_frame(&sink)[0], RED);
    }

    #[test]
    fn test_control_next_and_color_and_brightness() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let map = PixelMap::identity(2);
        let mut children = [solid(RED, map), solid(GREEN, map)];
        let compositions =
            ModeCompositions::idle_only(Composition::Sequence(Sequence::new(&mut children)));
        let mut engine = FrameScheduler::<_, _, 2, 8>::new(
            &config(),
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();
        engine.tick(Instant::from_millis(0));
        assert_eq!(last_frame(&sink)[0], RED);

        channel.sender().try_send(ControlEvent::NextAnimation).unwrap();
        engine.tick(Instant::from_millis(16));
        assert_eq!(last_frame(&sink)[0], GREEN);

        channel.sender().try_send(ControlEvent::PreviousAnimation).unwrap();
        engine.tick(Instant::from_millis(32));
        assert_eq!(last_frame(&sink)[0], RED);

        channel.sender().try_send(ControlEvent::SetColor(BLUE)).unwrap();
        engine.tick(Instant::from_millis(48));
        assert_eq!(last_frame(&sink)[0], BLUE);

        channel
            .sender()
            .try_send(ControlEvent::SetBrightness(128))
            .unwrap();
        engine.tick(Instant::from_millis(64));
        assert_eq!(last_frame(&sink)[0], Rgb::new(0, 0, 128));
    }

    #[test]
    fn test_alert_interrupts_and_expires() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let compositions = ModeCompositions {
            startup: None,
            idle: solid(GREEN, PixelMap::identity(2)),
            active: None,
            alert: Some(Composition::Effect(BoundEffect::new(
                EffectSlot::Blink(BlinkEffect::new(WHITE, Duration::from_millis(200))),
                PixelMap::identity(2),
            ))),
        };
        let mut engine = FrameScheduler::<_, _, 2, 8>::new(
            &config(),
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();
        engine.tick(Instant::from_millis(0));
        assert_eq!(last_frame(&sink)[0], GREEN);

        // A hard shake crosses the alert threshold.
        engine.devices_mut().accel = Some([3.0, 0.0, 0.0]);
        engine.tick(Instant::from_millis(100));
        assert_eq!(engine.mode(), ModeKind::Alert);
        assert_eq!(engine.machine_mut().alert_cause(), Some(AlertCause::Accel));
        assert_eq!(last_frame(&sink)[0], WHITE);

        engine.devices_mut().accel = Some([0.1, 0.0, 0.0]);
        for ms in (200..=2_000).step_by(100) {
            engine.tick(Instant::from_millis(ms));
            assert_eq!(engine.mode(), ModeKind::Alert, "at {ms}");
        }

        engine.tick(Instant::from_millis(2_100));
        assert_eq!(engine.mode(), ModeKind::Idle);
        assert_eq!(last_frame(&sink)[0], GREEN);
    }

    #[test]
    fn test_active_falls_back_to_idle_composition() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let compositions = ModeCompositions::idle_only(solid(GREEN, PixelMap::identity(2)));
        let mut engine = FrameScheduler::<_, _, 2, 8>::new(
            &config(),
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();
        engine.tick(Instant::from_millis(0));

        engine.devices_mut().accel = Some([1.8, 0.0, 0.0]);
        engine.tick(Instant::from_millis(100));
        assert_eq!(engine.mode(), ModeKind::Active);
        assert_eq!(last_frame(&sink)[0], GREEN);
    }

    #[test]
    fn test_startup_plays_then_idles() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let sweep = CometEffect::new(CometColor::Fixed(WHITE), 16.0, 2, false).run_once();
        let compositions = ModeCompositions {
            startup: Some(Composition::Effect(BoundEffect::new(
                EffectSlot::Comet(sweep),
                PixelMap::identity(8),
            ))),
            idle: solid(GREEN, PixelMap::identity(8)),
            active: None,
            alert: None,
        };
        let mut engine = FrameScheduler::<_, _, 8, 8>::new(
            &EngineConfig {
                tick_delta_max: Duration::from_millis(100),
                ..config()
            },
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();
        engine.tick(Instant::from_millis(0));
        assert_eq!(engine.mode(), ModeKind::Startup);

        let mut ms = 0;
        while engine.mode() == ModeKind::Startup && ms < 5_000 {
            ms += 100;
            engine.tick(Instant::from_millis(ms));
        }
        assert_eq!(engine.mode(), ModeKind::Idle);

        engine.tick(Instant::from_millis(ms + 100));
        assert!(last_frame(&sink).iter().all(|px| *px == GREEN));
    }

    #[test]
    fn test_startup_less_power_on_goes_straight_to_idle() {
        let channel = ControlChannel::<8>::new();
        let sink = TestSink::default();
        let compositions = ModeCompositions::idle_only(solid(RED, PixelMap::identity(2)));
        let mut engine = FrameScheduler::<_, _, 2, 8>::new(
            &config(),
            compositions,
            sink.clone(),
            TestDevices::default(),
            Some(channel.receiver()),
        )
        .unwrap();

        channel.sender().try_send(ControlEvent::PowerOn).unwrap();
        engine.tick(Instant::from_millis(0));
        assert_eq!(engine.mode(), ModeKind::Idle);
    }

    #[test]
    fn test_failing_sink_drops_at_most_one_frame() {
        let sink = TestSink::default();
        let compositions = ModeCompositions::idle_only(solid(RED, PixelMap::identity(2)));
        let mut engine = FrameScheduler::<_, _, 2, 8>::new(
            &config(),
            compositions,
            sink.clone(),
            TestDevices::default(),
            None,
        )
        .unwrap();

        // One failure: the in-frame retry still delivers.
        sink.fail_next.set(1);
        engine.tick(Instant::from_millis(0));
        assert_eq!(sink.frames.borrow().len(), 1);

        // Two failures: this frame is dropped, the loop keeps going.
        sink.fail_next.set(2);
        engine.tick(Instant::from_millis(16));
        assert_eq!(sink.frames.borrow().len(), 1);

        engine.tick(Instant::from_millis(32));
        assert_eq!(sink.frames.borrow().len(), 2);
    }

    #[test]
    fn test_frame_pacing_and_drift_reset() {
        let compositions = ModeCompositions::idle_only(solid(RED, PixelMap::identity(2)));
        let mut engine = FrameScheduler::<_, _, 2, 8>::new(
            &EngineConfig {
                frame_budget: Duration::from_millis(16),
                ..config()
            },
            compositions,
            TestSink::default(),
            TestDevices::default(),
            None,
        )
        .unwrap();

        let result = engine.tick(Instant::from_millis(0));
        assert_eq!(result.next_deadline, Instant::from_millis(16));
        assert_eq!(result.sleep_duration, Duration::from_millis(16));

        let result = engine.tick(Instant::from_millis(16));
        assert_eq!(result.next_deadline, Instant::from_millis(32));
        assert_eq!(result.sleep_duration, Duration::from_millis(16));

        // A long stall abandons the backlog instead of replaying it.
        let result = engine.tick(Instant::from_millis(100));
        assert_eq!(result.next_deadline, Instant::from_millis(116));
        assert_eq!(result.sleep_duration, Duration::from_millis(16));
    }

    #[test]
    fn test_pacing_disabled_by_zero_budget() {
        let compositions = ModeCompositions::idle_only(solid(RED, PixelMap::identity(2)));
        let mut engine = FrameScheduler::<_, _, 2, 8>::new(
            &config(),
            compositions,
            TestSink::default(),
            TestDevices::default(),
            None,
        )
        .unwrap();

        let result = engine.tick(Instant::from_millis(40));
        assert_eq!(result.sleep_duration, Duration::from_ticks(0));
        assert_eq!(result.next_deadline, Instant::from_millis(40));
    }
}
