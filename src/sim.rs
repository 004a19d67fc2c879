//! Host-side simulation of the handheld: a scripted keyboard controller, a stand-in Mac, and an
//! in-memory LCD, driven through the real input, tick and scan-out paths.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use picomac_input::keycode::raw_key;
use picomac_input::{
    BusError, I2cTransport, InputPipeline, KeyState, KeyboardController, RawKeyEvent, Register,
    SystemAction, KEYBOARD_I2C_ADDR,
};
use picomac_ipc::KeyEventRing;
use picomac_shared::{InputMode, SharedInputState, SharedViewport, ViewportOffset};
use picomac_video::{
    GuestRam, MemoryDisplay, PixelFormat, Scanout, ScreenGeometry, MOUSE_X_ADDR, MOUSE_Y_ADDR,
    VISIBLE_HEIGHT, VISIBLE_WIDTH,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{BridgeConfig, ConfigError};
use crate::machine::{MacMachine, MachineTicker};
use crate::system::LatchedSystemControl;

/// Simulated time between input polls.
pub const SIM_POLL_US: u64 = 1_000;

/// Guest address of the synthetic Mac's framebuffer.
pub const FRAMEBUFFER_BASE: u32 = 0x1_0000;

const CONTROLLER_VERSION: u8 = 0x10;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read key script {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse key script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("step {step}: unknown key {key:?}")]
    UnknownKey { step: usize, key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pressed,
    Released,
    Hold,
    LongHold,
    /// Press immediately followed by release.
    #[default]
    Tap,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Key {
        key: String,
        #[serde(default)]
        state: StepState,
    },
    Type {
        #[serde(rename = "type")]
        text: String,
    },
    /// Idle controller reads.
    Wait { wait: u32 },
}

/// Keystrokes fed to the simulated keyboard controller, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyScript {
    pub steps: Vec<ScriptStep>,
}

impl KeyScript {
    pub fn from_json_str(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Controller FIFO words for the whole script. Waits become empty (`0`) words.
    pub fn fifo_words(&self) -> Result<Vec<u16>, ScriptError> {
        let mut words = Vec::new();
        for (step, item) in self.steps.iter().enumerate() {
            match item {
                ScriptStep::Key { key, state } => {
                    let code = raw_key::from_name(key).ok_or_else(|| ScriptError::UnknownKey {
                        step,
                        key: key.clone(),
                    })?;
                    push_step(&mut words, code, *state);
                }
                ScriptStep::Type { text } => {
                    for c in text.chars() {
                        let code = raw_key::from_name(c.encode_utf8(&mut [0; 4])).ok_or_else(
                            || ScriptError::UnknownKey {
                                step,
                                key: c.to_string(),
                            },
                        )?;
                        push_step(&mut words, code, StepState::Tap);
                    }
                }
                ScriptStep::Wait { wait } => {
                    words.extend(std::iter::repeat(0).take(*wait as usize));
                }
            }
        }
        Ok(words)
    }
}

fn push_step(words: &mut Vec<u16>, code: u8, state: StepState) {
    let mut push = |state| words.push(RawKeyEvent::new(code, state).to_fifo_word());
    match state {
        StepState::Pressed => push(KeyState::Pressed),
        StepState::Released => push(KeyState::Released),
        StepState::Hold => push(KeyState::Hold),
        StepState::LongHold => push(KeyState::LongHold),
        StepState::Tap => {
            push(KeyState::Pressed);
            push(KeyState::Released);
        }
    }
}

/// Register-level model of the keyboard microcontroller, answering from a queue of FIFO words.
#[derive(Debug, Default)]
pub struct ScriptedController {
    fifo: VecDeque<u16>,
    selected: Option<Register>,
}

impl ScriptedController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.fifo.iter().filter(|&&w| w != 0).count()
    }
}

impl Extend<u16> for ScriptedController {
    fn extend<I: IntoIterator<Item = u16>>(&mut self, iter: I) {
        self.fifo.extend(iter);
    }
}

impl I2cTransport for ScriptedController {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
        if addr != KEYBOARD_I2C_ADDR {
            return Err(BusError::Nack);
        }
        let Some(&reg) = bytes.first() else {
            return Err(BusError::Transport("empty write".into()));
        };
        self.selected = Register::from_u8(reg);
        Ok(())
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), BusError> {
        if addr != KEYBOARD_I2C_ADDR {
            return Err(BusError::Nack);
        }
        let value: u16 = match self.selected.take() {
            Some(Register::Fifo) => self.fifo.pop_front().unwrap_or(0),
            Some(Register::KeyStatus) => self.pending().min(0x1F) as u16,
            Some(Register::Version) => u16::from(CONTROLLER_VERSION),
            Some(_) => 0,
            None => return Err(BusError::Transport("read without register select".into())),
        };
        for (dst, src) in buf.iter_mut().zip(value.to_le_bytes()) {
            *dst = src;
        }
        Ok(())
    }
}

/// Stand-in for the emulated Mac. It keeps a desktop pattern in its framebuffer, moves an XOR
/// block cursor on vsync, and mirrors the mouse position into the low-memory globals that
/// scan-out reads.
#[derive(Debug)]
pub struct SyntheticMac {
    ram: Vec<u8>,
    geometry: ScreenGeometry,
    mouse: (i32, i32),
    button: bool,
    drawn_cursor: Option<(i32, i32)>,
    keys: Vec<(u8, bool)>,
    loops: u64,
    vsyncs: u64,
    seconds: u64,
}

const CURSOR_SIZE: i32 = 8;
const MENU_BAR_HEIGHT: u32 = 20;

impl SyntheticMac {
    pub fn new(geometry: ScreenGeometry) -> Self {
        let mut mac = Self {
            ram: vec![0; FRAMEBUFFER_BASE as usize + geometry.framebuffer_len()],
            geometry,
            mouse: (
                geometry.virtual_width as i32 / 2,
                geometry.virtual_height as i32 / 2,
            ),
            button: false,
            drawn_cursor: None,
            keys: Vec::new(),
            loops: 0,
            vsyncs: 0,
            seconds: 0,
        };
        mac.paint_desktop();
        mac.store_mouse();
        mac
    }

    pub fn mouse(&self) -> (i32, i32) {
        self.mouse
    }

    pub fn button(&self) -> bool {
        self.button
    }

    pub fn keys(&self) -> &[(u8, bool)] {
        &self.keys
    }

    pub fn vsyncs(&self) -> u64 {
        self.vsyncs
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn loops(&self) -> u64 {
        self.loops
    }

    fn framebuffer_mut(&mut self) -> &mut [u8] {
        &mut self.ram[FRAMEBUFFER_BASE as usize..]
    }

    fn paint_desktop(&mut self) {
        let stride = self.geometry.stride();
        let height = self.geometry.virtual_height as usize;
        let fb = self.framebuffer_mut();
        for (y, row) in fb.chunks_mut(stride).take(height).enumerate() {
            let fill = if y < MENU_BAR_HEIGHT as usize - 1 {
                0x00
            } else if y == MENU_BAR_HEIGHT as usize - 1 {
                0xFF
            } else if y % 2 == 0 {
                0xAA
            } else {
                0x55
            };
            row.fill(fill);
        }
    }

    fn xor_cursor(&mut self, (cx, cy): (i32, i32)) {
        let stride = self.geometry.stride();
        let (w, h) = (
            self.geometry.virtual_width as i32,
            self.geometry.virtual_height as i32,
        );
        let fb = self.framebuffer_mut();
        for y in cy..(cy + CURSOR_SIZE).min(h) {
            for x in cx..(cx + CURSOR_SIZE).min(w) {
                let idx = y as usize * stride + x as usize / 8;
                fb[idx] ^= 0x80 >> (x % 8);
            }
        }
    }

    fn store_mouse(&mut self) {
        let (x, y) = self.mouse;
        let x = (x as i16).to_be_bytes();
        let y = (y as i16).to_be_bytes();
        self.ram[MOUSE_X_ADDR as usize..][..2].copy_from_slice(&x);
        self.ram[MOUSE_Y_ADDR as usize..][..2].copy_from_slice(&y);
    }
}

impl GuestRam for SyntheticMac {
    fn read_bytes(&self, addr: u32, len: usize) -> Option<&[u8]> {
        self.ram.read_bytes(addr, len)
    }
}

impl MacMachine for SyntheticMac {
    fn run_loop(&mut self) {
        self.loops += 1;
    }

    fn on_vsync(&mut self) {
        self.vsyncs += 1;
        if self.drawn_cursor == Some(self.mouse) {
            return;
        }
        if let Some(old) = self.drawn_cursor.take() {
            self.xor_cursor(old);
        }
        self.xor_cursor(self.mouse);
        self.drawn_cursor = Some(self.mouse);
    }

    fn on_one_hz(&mut self) {
        self.seconds += 1;
    }

    fn submit_pointer(&mut self, dx: i32, dy: i32, button: bool) {
        let max_x = self.geometry.virtual_width as i32 - 1;
        let max_y = self.geometry.virtual_height as i32 - 1;
        self.mouse.0 = (self.mouse.0 + dx).clamp(0, max_x);
        // Positive dy is upward; the framebuffer grows downward.
        self.mouse.1 = (self.mouse.1 - dy).clamp(0, max_y);
        self.button = button;
        self.store_mouse();
    }

    fn submit_key(&mut self, code: u8, pressed: bool) {
        tracing::debug!(code = format_args!("{code:#04x}"), pressed, "mac key");
        self.keys.push((code, pressed));
    }
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimReport {
    pub frames: u64,
    /// Frames that scan-out actually drew.
    pub rendered_frames: u64,
    pub elapsed_us: u64,
    pub machine_loops: u64,
    pub mode: String,
    pub mouse: (i32, i32),
    pub button: bool,
    pub viewport: (i32, i32),
    pub keys_delivered: usize,
    pub keys_pending: usize,
    pub vsyncs: u64,
    pub seconds: u64,
    pub system_action: Option<String>,
}

pub type SimPipeline = InputPipeline<KeyboardController<ScriptedController>, LatchedSystemControl>;

/// The whole handheld in one thread with simulated time: input polls every [`SIM_POLL_US`],
/// the machine ticks after each poll, and a frame is scanned out every vsync period.
pub struct Simulation<P: PixelFormat> {
    pipeline: SimPipeline,
    ticker: MachineTicker,
    scanout: Scanout<P>,
    mac: SyntheticMac,
    lcd: MemoryDisplay<P>,
    ring: Arc<KeyEventRing>,
    input: Arc<SharedInputState>,
    viewport: Arc<SharedViewport>,
    frame_period_us: u64,
    now_us: u64,
    frames: u64,
}

impl<P: PixelFormat> Simulation<P> {
    pub fn new(config: &BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let input_config = config.input()?;
        let geometry = config.geometry();

        let ring = Arc::new(KeyEventRing::new());
        let input = Arc::new(SharedInputState::new(input_config.initial_mode));
        let viewport = Arc::new(SharedViewport::new());

        let mut pipeline = InputPipeline::new(
            KeyboardController::new(ScriptedController::new()),
            LatchedSystemControl::new(),
            Arc::clone(&ring),
            Arc::clone(&input),
            input_config,
        );
        match pipeline.bus_mut().firmware_version() {
            Ok(version) => tracing::info!(version = format_args!("{version:#04x}"), "keyboard controller"),
            Err(err) => tracing::warn!(%err, "keyboard controller version read failed"),
        }
        pipeline.reset();

        let ticker = MachineTicker::new(Arc::clone(&ring), Arc::clone(&input), config.timings());
        let mut scanout = Scanout::new(geometry, Arc::clone(&viewport))?;
        scanout.set_rows_per_poll(config.rows_per_poll);
        scanout.attach_framebuffer(FRAMEBUFFER_BASE);

        Ok(Self {
            pipeline,
            ticker,
            scanout,
            mac: SyntheticMac::new(geometry),
            lcd: MemoryDisplay::new(VISIBLE_WIDTH, VISIBLE_HEIGHT),
            ring,
            input,
            viewport,
            frame_period_us: config.vsync_period_us,
            now_us: 0,
            frames: 0,
        })
    }

    /// Queue controller FIFO words behind anything not yet read.
    pub fn feed(&mut self, words: impl IntoIterator<Item = u16>) {
        self.pipeline.bus_mut().transport_mut().extend(words);
    }

    pub fn lcd(&self) -> &MemoryDisplay<P> {
        &self.lcd
    }

    pub fn mac(&self) -> &SyntheticMac {
        &self.mac
    }

    pub fn system_action(&self) -> Option<SystemAction> {
        self.pipeline.system().requested()
    }

    /// Advance one frame period, then scan out a frame.
    pub fn step_frame(&mut self) {
        let frame_end = self.now_us + self.frame_period_us;
        while self.now_us < frame_end {
            self.pipeline.poll_input();
            self.ticker.poll(&mut self.mac, self.now_us);
            self.now_us += SIM_POLL_US;
        }

        let pipeline = &mut self.pipeline;
        self.scanout.render_frame(&self.mac, &mut self.lcd, || {
            pipeline.poll_input();
        });
        self.frames += 1;
    }

    /// Run up to `frames` frames, stopping early if a system action was requested.
    pub fn run(&mut self, frames: u64) -> SimReport {
        for _ in 0..frames {
            if let Some(action) = self.system_action() {
                tracing::info!(?action, frame = self.frames, "stopping on system action");
                break;
            }
            self.step_frame();
        }
        self.report()
    }

    pub fn report(&self) -> SimReport {
        let ViewportOffset { x, y } = self.viewport.load();
        SimReport {
            frames: self.frames,
            rendered_frames: self.scanout.frames(),
            elapsed_us: self.now_us,
            machine_loops: self.mac.loops(),
            mode: match self.input.mode() {
                InputMode::Key => "key".into(),
                InputMode::Pointer => "pointer".into(),
            },
            mouse: self.mac.mouse(),
            button: self.mac.button(),
            viewport: (x, y),
            keys_delivered: self.mac.keys().len(),
            keys_pending: self.ring.len(),
            vsyncs: self.mac.vsyncs(),
            seconds: self.mac.seconds(),
            system_action: self.system_action().map(|a| format!("{a:?}")),
        }
    }
}
