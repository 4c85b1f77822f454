//! Wire traces
//!
//! Runs a scene through a `DirectDisplay` whose adapter talks to a
//! `RecordingInterface`, then replays the recording through the real SPI or
//! I2C framing layer onto logging fake buses. The result is the byte stream
//! a logic analyzer would show for the same drawing calls.

use anyhow::{bail, Result};
use colored::Colorize;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;
use tinydisplay::device::{
    AdapterInfo, DeviceAdapter, DirectDisplay, Ili9341, LcdMode, Pcd8544, Sh1106, Ssd1306,
    Ssd1325, Ssd1331, Ssd1351,
};
use tinydisplay::hal::mock::{RecordingInterface, WireEvent};
use tinydisplay::hal::{
    I2cBus, I2cConfig, I2cInterface, Interface, OutputPin, SpiBus, SpiConfig, SpiInterface,
};

use crate::controllers::{Bus, ControllerProfile, Model};
use crate::scene::Scene;

/// What to run before the scene
#[derive(Debug, Clone, Copy)]
pub struct TraceOptions {
    pub mode: LcdMode,
    pub bus: Bus,
    /// Push the controller init table first
    pub init: bool,
}

/// Recorded framing of one run
#[derive(Debug, Clone)]
pub struct Trace {
    pub events: Vec<WireEvent>,
    pub starts: usize,
    pub stops: usize,
    pub violations: usize,
    pub balanced: bool,
}

impl Trace {
    pub fn from_interface(intf: &RecordingInterface) -> Self {
        Self {
            events: intf.events().to_vec(),
            starts: intf.starts(),
            stops: intf.stops(),
            violations: intf.violations(),
            balanced: intf.is_balanced(),
        }
    }

    pub fn command_bytes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, WireEvent::Command(_)))
            .count()
    }

    pub fn data_bytes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, WireEvent::Data(_)))
            .count()
    }
}

/// Geometry of a model in its power-up orientation
pub fn adapter_info(model: Model) -> AdapterInfo {
    let intf = RecordingInterface::new();
    match model {
        Model::Ssd1306(variant) => Ssd1306::new(intf, variant).info(),
        Model::Sh1106 => Sh1106::new(intf).info(),
        Model::Pcd8544 => Pcd8544::new(intf).info(),
        Model::Ssd1325 => Ssd1325::new(intf).info(),
        Model::Ssd1331 => Ssd1331::new(intf).info(),
        Model::Ssd1351 => Ssd1351::new(intf).info(),
        Model::Ili9341 => Ili9341::new(intf).info(),
    }
}

fn trace_with<A>(adapter: A, scene: &Scene, opts: TraceOptions) -> Result<Trace>
where
    A: DeviceAdapter<Interface = RecordingInterface>,
{
    let mut display = DirectDisplay::new(adapter);
    if opts.init {
        display.init();
    }
    display.set_mode(opts.mode);
    scene.draw(&mut display)?;
    let mut adapter = display.release();
    Ok(Trace::from_interface(adapter.interface()))
}

/// Runs `scene` directly against the profile's driver
pub fn run_trace(profile: &ControllerProfile, scene: &Scene, opts: TraceOptions) -> Result<Trace> {
    if !profile.supports(opts.bus) {
        bail!("{} is not wired over {}", profile.name, opts.bus);
    }
    if !profile.supports_mode(opts.mode) {
        bail!("{} has no {} addressing mode", profile.name, opts.mode);
    }
    log::info!(
        "tracing {} ops on {} ({} mode, {})",
        scene.ops.len(),
        profile.name,
        opts.mode,
        opts.bus
    );
    let intf = RecordingInterface::new();
    match profile.model {
        Model::Ssd1306(variant) => trace_with(Ssd1306::new(intf, variant), scene, opts),
        Model::Sh1106 => trace_with(Sh1106::new(intf), scene, opts),
        Model::Pcd8544 => trace_with(Pcd8544::new(intf), scene, opts),
        Model::Ssd1325 => trace_with(Ssd1325::new(intf), scene, opts),
        Model::Ssd1331 => trace_with(Ssd1331::new(intf), scene, opts),
        Model::Ssd1351 => trace_with(Ssd1351::new(intf), scene, opts),
        Model::Ili9341 => trace_with(Ili9341::new(intf), scene, opts),
    }
}

/// Bus-level operation seen by the fake buses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Configure { frequency_hz: u32, mode: u8 },
    Select,
    Deselect,
    /// D/C pin level: low for commands
    Dc(bool),
    Begin(u8),
    End,
    Byte(u8),
}

type BusLog = Rc<RefCell<Vec<BusOp>>>;

struct LogSpi(BusLog);
struct LogPin(BusLog);
struct LogI2c(BusLog);

impl SpiBus for LogSpi {
    fn configure(&mut self, config: SpiConfig) {
        self.0.borrow_mut().push(BusOp::Configure {
            frequency_hz: config.frequency_hz,
            mode: config.mode,
        });
    }

    fn select(&mut self) {
        self.0.borrow_mut().push(BusOp::Select);
    }

    fn deselect(&mut self) {
        self.0.borrow_mut().push(BusOp::Deselect);
    }

    fn write(&mut self, byte: u8) {
        self.0.borrow_mut().push(BusOp::Byte(byte));
    }
}

impl OutputPin for LogPin {
    fn set_high(&mut self) {
        self.0.borrow_mut().push(BusOp::Dc(true));
    }

    fn set_low(&mut self) {
        self.0.borrow_mut().push(BusOp::Dc(false));
    }
}

impl I2cBus for LogI2c {
    fn begin(&mut self, address: u8) {
        self.0.borrow_mut().push(BusOp::Begin(address));
    }

    fn end(&mut self) {
        self.0.borrow_mut().push(BusOp::End);
    }

    fn write(&mut self, byte: u8) {
        self.0.borrow_mut().push(BusOp::Byte(byte));
    }
}

/// Feeds recorded events back through a framing layer. A mode switch is
/// issued before the first byte of each run of commands or data; switches
/// with no bytes after them were never recorded and do not appear.
fn replay<I: Interface>(events: &[WireEvent], intf: &mut I) {
    let mut data_mode = None;
    for event in events {
        match *event {
            WireEvent::Start => {
                intf.start();
                data_mode = None;
            }
            WireEvent::Stop => intf.stop(),
            WireEvent::Command(b) => {
                if data_mode != Some(false) {
                    intf.command_mode();
                    data_mode = Some(false);
                }
                intf.send(b);
            }
            WireEvent::Data(b) => {
                if data_mode != Some(true) {
                    intf.data_mode();
                    data_mode = Some(true);
                }
                intf.send(b);
            }
        }
    }
}

pub fn replay_spi(events: &[WireEvent], config: SpiConfig) -> Vec<BusOp> {
    let log = BusLog::default();
    let mut intf = SpiInterface::new(LogSpi(log.clone()), LogPin(log.clone()), config);
    replay(events, &mut intf);
    drop(intf);
    let ops = log.borrow().clone();
    ops
}

pub fn replay_i2c(events: &[WireEvent], config: I2cConfig) -> Vec<BusOp> {
    let log = BusLog::default();
    let mut intf = I2cInterface::new(LogI2c(log.clone()), config);
    replay(events, &mut intf);
    drop(intf);
    let ops = log.borrow().clone();
    ops
}

/// Replays `trace` over `bus` with the profile's settings
pub fn bus_ops(trace: &Trace, profile: &ControllerProfile, bus: Bus) -> Vec<BusOp> {
    match bus {
        Bus::Spi => replay_spi(&trace.events, profile.spi),
        Bus::I2c => replay_i2c(&trace.events, I2cConfig::default()),
    }
}

/// One text line per bus transaction. At most `limit` bytes are spelled
/// out per line.
pub fn format_transactions(ops: &[BusOp], limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut shown = 0usize;
    let mut hidden = 0usize;

    for op in ops {
        match *op {
            BusOp::Configure { frequency_hz, mode } => {
                lines.push(format!("spi mode {} @ {} Hz", mode, frequency_hz));
            }
            BusOp::Select => line.push_str("CS"),
            BusOp::Begin(addr) => {
                let _ = write!(line, "S {:02X}", addr << 1);
            }
            BusOp::Dc(high) => line.push_str(if high { " D:" } else { " C:" }),
            BusOp::Byte(b) => {
                if shown < limit {
                    let _ = write!(line, " {:02x}", b);
                    shown += 1;
                } else {
                    hidden += 1;
                }
            }
            BusOp::Deselect | BusOp::End => {
                if hidden > 0 {
                    let _ = write!(line, " ... +{} bytes", hidden);
                }
                line.push_str(if *op == BusOp::End { " P" } else { " /CS" });
                lines.push(std::mem::take(&mut line));
                shown = 0;
                hidden = 0;
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Prints a colored trace summary and the per-transaction byte listing
pub fn print_report(profile: &ControllerProfile, trace: &Trace, ops: &[BusOp], limit: usize) {
    println!("{}", "=".repeat(70));
    println!("{}", format!("Wire Trace: {}", profile.name).cyan().bold());
    println!("{}", "=".repeat(70));

    for line in format_transactions(ops, limit) {
        let colored = if line.starts_with("spi") {
            line.dimmed()
        } else {
            line.normal()
        };
        println!("  {}", colored);
    }

    println!("\n{}", "Summary:".white().bold());
    println!("  Sessions: {} started, {} stopped", trace.starts, trace.stops);
    println!("  Command bytes: {}", trace.command_bytes().to_string().yellow());
    println!("  Data bytes: {}", trace.data_bytes().to_string().green());
    if trace.balanced {
        println!("  {} every session closed", "[OK]".green().bold());
    } else {
        println!(
            "  {} unbalanced sessions ({} framing violations)",
            "[ERROR]".red().bold(),
            trace.violations
        );
    }
    println!("{}", "=".repeat(70));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::get_profile;
    use std::path::Path;

    fn rect_scene() -> Scene {
        Scene::parse(
            "[surface]\nwidth = 8\nheight = 8\n\n[font]\nbuiltin = \"6x8\"\n\n[[op]]\nkind = \"rect\"\nx1 = -4\ny1 = -4\nx2 = 500\ny2 = 500\n\n[[op]]\nkind = \"text\"\nx = 100\ny = 60\ntext = \"edge\"\n",
            Path::new("."),
        )
        .unwrap()
    }

    #[test]
    fn test_every_controller_stays_balanced() {
        let scene = rect_scene();
        for id in crate::controllers::profile_ids() {
            let profile = get_profile(id).unwrap();
            for &mode in profile.modes {
                let opts = TraceOptions {
                    mode,
                    bus: profile.buses[0],
                    init: true,
                };
                let trace = run_trace(profile, &scene, opts).unwrap();
                assert!(trace.balanced, "{} {}", id, mode);
                assert!(trace.data_bytes() > 0, "{} {}", id, mode);
            }
        }
    }

    #[test]
    fn test_rejects_unsupported_bus_and_mode() {
        let scene = rect_scene();
        let pcd = get_profile("pcd8544").unwrap();
        let opts = TraceOptions {
            mode: LcdMode::Compatible,
            bus: Bus::I2c,
            init: false,
        };
        assert!(run_trace(pcd, &scene, opts).is_err());
        let opts = TraceOptions {
            mode: LcdMode::Normal,
            bus: Bus::Spi,
            init: false,
        };
        assert!(run_trace(pcd, &scene, opts).is_err());
    }

    #[test]
    fn test_i2c_replay_control_bytes() {
        let events = [
            WireEvent::Start,
            WireEvent::Command(0xAF),
            WireEvent::Data(0x01),
            WireEvent::Stop,
        ];
        assert_eq!(
            replay_i2c(&events, I2cConfig::default()),
            vec![
                BusOp::Begin(0x3C),
                BusOp::Byte(0x00),
                BusOp::Byte(0xAF),
                BusOp::End,
                BusOp::Begin(0x3C),
                BusOp::Byte(0x40),
                BusOp::Byte(0x01),
                BusOp::End,
            ]
        );
    }

    #[test]
    fn test_spi_replay_dc_pin() {
        let events = [
            WireEvent::Start,
            WireEvent::Command(0x2C),
            WireEvent::Data(0xF8),
            WireEvent::Data(0x00),
            WireEvent::Stop,
        ];
        let ops = replay_spi(&events, SpiConfig::TFT);
        assert_eq!(
            ops,
            vec![
                BusOp::Configure {
                    frequency_hz: 32_000_000,
                    mode: 0
                },
                BusOp::Select,
                BusOp::Dc(false),
                BusOp::Byte(0x2C),
                BusOp::Dc(true),
                BusOp::Byte(0xF8),
                BusOp::Byte(0x00),
                BusOp::Deselect,
            ]
        );
        let lines = format_transactions(&ops, 1);
        assert_eq!(lines[0], "spi mode 0 @ 32000000 Hz");
        assert_eq!(lines[1], "CS C: 2c D: ... +2 bytes /CS");
    }

    #[test]
    fn test_unbalanced_recording_is_reported() {
        let mut intf = RecordingInterface::new();
        intf.start();
        intf.send(0x00);
        let trace = Trace::from_interface(&intf);
        assert!(!trace.balanced);
        assert_eq!(trace.command_bytes(), 1);
    }
}
