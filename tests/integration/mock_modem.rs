//! Simulated SARA module for integration tests.
//!
//! [`ScriptedAt`] stands in for the transaction engine: it records every
//! command, answers from per-command reply queues, delivers scripted URCs
//! to the session's subscribers and models power-on latency against a
//! shared [`MockClock`].  Time only moves when the code under test sleeps
//! or a command times out.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use rn4modem::app::ports::{AtPort, Clock, PowerControl, SerialPort};
use rn4modem::{AtResult, ByteSpan, CommandError, Modem, ModemConfig, UrcHandler};

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
}

impl MockClock {
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

// ── Serial channel ────────────────────────────────────────────

#[derive(Default)]
pub struct MockSerial {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    /// Cap on bytes returned by one `read`.
    pub read_limit: Option<usize>,
    /// Every `read` fails.
    pub fail_reads: bool,
}

#[allow(dead_code)]
impl MockSerial {
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }
}

impl SerialPort for MockSerial {
    type Error = ();

    fn available(&mut self) -> usize {
        self.input.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        if self.fail_reads {
            return Err(());
        }
        let limit = self.read_limit.unwrap_or(usize::MAX);
        let n = buf.len().min(self.input.len()).min(limit);
        for (slot, byte) in buf.iter_mut().zip(self.input.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.output.extend_from_slice(data);
        Ok(data.len())
    }
}

// ── Power ─────────────────────────────────────────────────────

/// Simulated supply shared by [`MockPower`] and [`ScriptedAt`].
#[derive(Clone, Default)]
pub struct Supply {
    /// The module answers `AT` once the clock reaches this time.
    answers_from: Rc<Cell<Option<u64>>>,
    pub calls: Rc<RefCell<Vec<bool>>>,
}

impl Supply {
    pub fn already_on() -> Self {
        let supply = Self::default();
        supply.answers_from.set(Some(0));
        supply
    }

    fn answering(&self, now: u64) -> bool {
        self.answers_from.get().is_some_and(|t| now >= t)
    }
}

pub struct MockPower {
    supply: Supply,
    clock: MockClock,
    /// Boot time after power is applied; `None` never boots.
    boot_ms: Option<u64>,
}

impl PowerControl for MockPower {
    fn power_on(&mut self) {
        self.supply.calls.borrow_mut().push(true);
        let from = self.boot_ms.map(|b| self.clock.now_ms() + b);
        self.supply.answers_from.set(from);
    }

    fn power_off(&mut self) {
        self.supply.calls.borrow_mut().push(false);
        self.supply.answers_from.set(None);
    }
}

// ── Scripted engine ───────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Reply {
    urcs: Vec<(String, String)>,
    outcome: Result<String, CommandError>,
}

#[allow(dead_code)]
impl Reply {
    pub fn ok(text: &str) -> Self {
        Self {
            urcs: Vec::new(),
            outcome: Ok(text.to_owned()),
        }
    }

    pub fn error() -> Self {
        Self {
            urcs: Vec::new(),
            outcome: Err(CommandError::Protocol),
        }
    }

    pub fn timeout() -> Self {
        Self {
            urcs: Vec::new(),
            outcome: Err(CommandError::Timeout),
        }
    }

    pub fn with_urc(mut self, code: &str, data: &str) -> Self {
        self.urcs.push((code.to_owned(), data.to_owned()));
        self
    }
}

pub struct ScriptedAt {
    pub commands: Vec<String>,
    pub init_calls: usize,
    pub init_result: bool,
    pub serial: MockSerial,
    scripts: HashMap<String, VecDeque<Reply>>,
    supply: Supply,
    clock: MockClock,
    response: Vec<u8>,
}

#[allow(dead_code)]
impl ScriptedAt {
    /// Queue `reply` for `command`.  The last queued reply keeps being
    /// returned once the queue is down to one entry.
    pub fn on(&mut self, command: &str, reply: Reply) -> &mut Self {
        self.scripts.entry(command.to_owned()).or_default().push_back(reply);
        self
    }

    /// Replace whatever is queued for `command` with `reply`.
    pub fn set(&mut self, command: &str, reply: Reply) -> &mut Self {
        self.scripts.insert(command.to_owned(), VecDeque::from([reply]));
        self
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands.iter().filter(|c| c.as_str() == command).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.commands.iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Commands other than the `AT` liveness probe.
    pub fn non_probe_commands(&self) -> Vec<&str> {
        self.commands
            .iter()
            .map(String::as_str)
            .filter(|c| *c != "AT")
            .collect()
    }

    fn next_reply(&mut self, command: &str) -> Option<Reply> {
        let queue = self.scripts.get_mut(command)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl AtPort for ScriptedAt {
    type Serial = MockSerial;

    fn init_terminal(&mut self) -> bool {
        self.init_calls += 1;
        self.init_result
    }

    fn command(
        &mut self,
        command: &str,
        timeout_ms: u32,
        urc: &mut dyn UrcHandler,
    ) -> AtResult<ByteSpan<'_>> {
        self.commands.push(command.to_owned());
        self.response.clear();

        let reply = match self.next_reply(command) {
            Some(reply) => reply,
            None if command == "AT" && !self.supply.answering(self.clock.now_ms()) => Reply::timeout(),
            None => Reply::ok(""),
        };

        for (code, data) in &reply.urcs {
            let consumed = urc.handle_urc(ByteSpan::from_text(code), ByteSpan::from_text(data));
            if !consumed {
                self.response.extend_from_slice(format!("{code}: {data}").as_bytes());
            }
        }

        match reply.outcome {
            Ok(text) => {
                if !text.is_empty() && !self.response.is_empty() {
                    self.response.push(b'\n');
                }
                self.response.extend_from_slice(text.as_bytes());
                Ok(ByteSpan::new(&self.response))
            }
            Err(CommandError::Timeout) => {
                self.clock.advance(u64::from(timeout_ms));
                Err(CommandError::Timeout)
            }
            Err(e) => Err(e),
        }
    }

    fn serial_mut(&mut self) -> &mut MockSerial {
        &mut self.serial
    }
}

// ── Bench ─────────────────────────────────────────────────────

pub type TestModem = Modem<ScriptedAt, MockPower, MockClock, MockSerial, MockSerial>;

/// Everything a test needs to script a module and inspect the outcome.
pub struct Bench {
    pub at: ScriptedAt,
    pub clock: MockClock,
    pub supply: Supply,
    pub boot_ms: Option<u64>,
    pub config: ModemConfig,
    pub debug: MockSerial,
    pub gnss: MockSerial,
}

#[allow(dead_code)]
impl Bench {
    /// A module that is already powered and answering.
    pub fn new() -> Self {
        Self::with_supply(Supply::already_on())
    }

    /// A module that is off and boots `boot_ms` after power is applied.
    pub fn powered_off(boot_ms: Option<u64>) -> Self {
        let mut bench = Self::with_supply(Supply::default());
        bench.boot_ms = boot_ms;
        bench
    }

    fn with_supply(supply: Supply) -> Self {
        let clock = MockClock::default();
        let at = ScriptedAt {
            commands: Vec::new(),
            init_calls: 0,
            init_result: true,
            serial: MockSerial::default(),
            scripts: HashMap::new(),
            supply: supply.clone(),
            clock: clock.clone(),
            response: Vec::new(),
        };
        Self {
            at,
            clock,
            supply,
            boot_ms: Some(0),
            config: ModemConfig::default(),
            debug: MockSerial::default(),
            gnss: MockSerial::default(),
        }
    }

    pub fn build(self) -> TestModem {
        let power = MockPower {
            supply: self.supply,
            clock: self.clock.clone(),
            boot_ms: self.boot_ms,
        };
        Modem::new(self.at, power, self.clock, self.config)
            .with_debug_port(self.debug)
            .with_gnss_port(self.gnss)
    }
}
