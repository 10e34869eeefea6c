use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use joystick::{
    AxisSample, ButtonSample, Context, DeviceDescriptor, EventType, Report, ScriptedTransport,
};

fn bench_dispatch_frames(c: &mut Criterion) {
    let ctx: Context = Context::without_access();
    let (transport, handle) = ScriptedTransport::new();
    ctx.assign_seat("bench", transport).expect("seat should bind");
    handle.add_device("bench-pad", DeviceDescriptor::standard_gamepad("Bench Pad"));
    ctx.dispatch().expect("dispatch");
    while ctx.get_event().is_some() {}

    let mut tick: i16 = 0;
    c.bench_function("dispatch_full_gamepad_frame", |b| {
        b.iter(|| {
            tick = tick.wrapping_add(97);
            let pressure = (tick as u16).wrapping_mul(3);
            let report = Report::new()
                .axis(0, AxisSample::xy(tick, -tick))
                .axis(1, AxisSample::xy(tick / 2, 0))
                .button(0, ButtonSample::Digital(tick % 2 == 0))
                .button(6, ButtonSample::Analog(pressure))
                .dpad(0, 1 << 1);
            handle.frame("bench-pad", report);
            ctx.dispatch().expect("dispatch");

            let mut sink_count = 0usize;
            while let Some(event) = ctx.get_event() {
                if event.event_type() != EventType::Sync {
                    sink_count += 1;
                }
            }
            black_box(sink_count)
        })
    });
}

fn bench_idle_dispatch(c: &mut Criterion) {
    let ctx: Context = Context::without_access();
    let (transport, handle) = ScriptedTransport::new();
    ctx.assign_seat("bench", transport).expect("seat should bind");
    handle.add_device("bench-pad", DeviceDescriptor::standard_gamepad("Bench Pad"));
    let report = Report::new()
        .axis(0, AxisSample::xy(100, 100))
        .button(0, ButtonSample::Digital(true));

    c.bench_function("dispatch_unchanged_frame", |b| {
        b.iter(|| {
            handle.frame("bench-pad", black_box(report.clone()));
            ctx.dispatch().expect("dispatch");
            while ctx.get_event().is_some() {}
        })
    });
}

criterion_group!(benches, bench_dispatch_frames, bench_idle_dispatch);
criterion_main!(benches);
