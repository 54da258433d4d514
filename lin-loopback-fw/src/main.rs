#![no_main]
#![no_std]

use lin_loopback_common::{LinEvent, TestSummary};
use lin_loopback_fw as _;
use rtic_sync::channel::Receiver;

/// Depth of the event queue between the UART interrupt and the test task.
const EVENT_CHANNEL_SIZE: usize = 16;

#[rtic::app(device = stm32h7xx_hal::stm32, peripherals = true, dispatchers = [EXTI0])]
mod app {
    use lin_loopback_common::{LinMaster, LinTestConfig};
    use lin_loopback_fw::lin::Uart7Lin;
    use lin_loopback_fw::report;
    use rtic_monotonics::stm32::prelude::*;
    use rtic_sync::channel::Sender;
    use rtic_sync::make_channel;
    use stm32h7xx_hal::{prelude::*, rcc::PllConfigStrategy, serial::config::Config};

    use super::*;

    #[shared]
    struct SharedResources {
        lin: LinMaster<Uart7Lin>,
    }
    #[local]
    struct LocalResources {
        event_sender: Sender<'static, LinEvent, EVENT_CHANNEL_SIZE>,
    }

    stm32_tim2_monotonic!(Mono, 1_000_000);

    #[init]
    fn init(ctx: init::Context) -> (SharedResources, LocalResources) {
        let config = LinTestConfig::default();

        // Initialise power...
        let pwr = ctx.device.PWR.constrain();
        let pwrcfg = pwr.smps().freeze();

        // Initialise clocks...
        let rcc = ctx.device.RCC.constrain();
        let ccdr = rcc
            .use_hse(25.MHz())
            .sys_ck(200.MHz())
            .hclk(200.MHz())
            .pll1_strategy(PllConfigStrategy::Iterative)
            .freeze(pwrcfg, &ctx.device.SYSCFG);

        // UART7 on the Arduino header, TX wired to RX
        let gpiof = ctx.device.GPIOF.split(ccdr.peripheral.GPIOF);
        let tx = gpiof.pf7.into_alternate();
        let rx = gpiof.pf6.into_alternate();

        let serial_config = Config::new(config.bitrate.bps());
        let serial = ctx
            .device
            .UART7
            .serial((tx, rx), serial_config, ccdr.peripheral.UART7, &ccdr.clocks)
            .unwrap();
        let lin = LinMaster::new(Uart7Lin::new(serial, serial_config), &config);

        // Channels
        let (event_s, event_r) = make_channel!(LinEvent, EVENT_CHANNEL_SIZE);

        // Spawn tasks
        lin_function_test::spawn(config, event_r).unwrap();

        Mono::start(200_000_000);

        (
            SharedResources { lin },
            LocalResources {
                event_sender: event_s,
            },
        )
    }

    /// Runs after the test sequence is done, the board stays up for RTT.
    #[idle]
    fn idle(_: idle::Context) -> ! {
        loop {
            cortex_m::asm::nop();
        }
    }

    #[task(binds = UART7, shared = [lin], local = [event_sender], priority = 2)]
    fn uart7_event(mut ctx: uart7_event::Context) {
        let event_sender = ctx.local.event_sender;
        ctx.shared.lin.lock(|lin| {
            lin.handle_interrupt(|event| {
                defmt::trace!("LIN event: {}", event);
                if event_sender.try_send(event).is_err() {
                    defmt::warn!("Could not send LIN event to channel");
                }
            });
        });
    }

    #[task(shared = [lin], priority = 1)]
    async fn lin_function_test(
        mut ctx: lin_function_test::Context,
        config: LinTestConfig,
        mut events: Receiver<'static, LinEvent, EVENT_CHANNEL_SIZE>,
    ) {
        let timeout = u64::from(config.response_timeout_ms).millis();
        let mut summary = TestSummary::default();

        report::print_banner();

        if let Err(err) = ctx.shared.lin.lock(|lin| lin.start(&config)) {
            defmt::error!("Could not start LIN mode: {}", err);
            return;
        }
        defmt::info!(
            "LIN mode at {} bit/s, {} checksum, mismatch policy {}",
            config.bitrate,
            config.checksum,
            config.mismatch_policy
        );
        report::print_table_header();

        for id in config.ids() {
            let header = ctx.shared.lin.lock(|lin| lin.send_header(id));
            match header {
                Ok(header) if !header.id_in_range => {
                    defmt::println!("The ID is not match protocol");
                }
                Ok(_) => {}
                Err(err) => {
                    defmt::error!("Could not send header for id {=u8:#x}: {}", id, err);
                    return;
                }
            }

            let break_detected = Mono::timeout_after(
                timeout,
                next_matching(&mut events, &mut summary, |event| {
                    matches!(event, LinEvent::BreakDetected)
                }),
            )
            .await;
            if !matches!(break_detected, Ok(Some(_))) {
                defmt::warn!("No break detected for id {=u8:#x}", id);
                report::print_timeout(id);
                summary.record_timeout();
                continue;
            }

            let response = ctx
                .shared
                .lin
                .lock(|lin| lin.send_response(config.checksum, &config.pattern));
            if let Err(err) = response {
                defmt::error!("Could not send response for id {=u8:#x}: {}", id, err);
                return;
            }

            let checked = Mono::timeout_after(
                timeout,
                next_matching(&mut events, &mut summary, |event| {
                    matches!(event, LinEvent::FrameChecked(_))
                }),
            )
            .await;
            match checked {
                Ok(Some(LinEvent::FrameChecked(frame_report))) => {
                    report::print_row(&frame_report);
                }
                _ => {
                    defmt::warn!("Echo of id {=u8:#x} was not checked", id);
                    summary.record_unverified();
                }
            }

            Mono::delay(u64::from(config.inter_frame_delay_us).micros()).await;
        }

        ctx.shared.lin.lock(|lin| lin.stop());
        while let Ok(event) = events.try_recv() {
            summary.record_event(&event);
        }
        report::print_summary(&summary);
        if !summary.is_success() {
            defmt::error!("LIN loopback test failed");
        }
        // Returning hands the core back to `idle`
    }
}

/// Receives events until one matches `wanted`, counting all of them.
async fn next_matching(
    events: &mut Receiver<'static, LinEvent, EVENT_CHANNEL_SIZE>,
    summary: &mut TestSummary,
    wanted: impl Fn(&LinEvent) -> bool,
) -> Option<LinEvent> {
    while let Ok(event) = events.recv().await {
        summary.record_event(&event);
        if wanted(&event) {
            return Some(event);
        }
        match event {
            LinEvent::ByteDropped(byte) => {
                defmt::warn!("Receive buffer full, dropped {=u8:#x}", byte)
            }
            LinEvent::LineError(err) => defmt::warn!("Line error: {}", err),
            _ => defmt::debug!("Late event: {}", event),
        }
    }
    None
}
