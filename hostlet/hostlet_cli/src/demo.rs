//! Built-in demo guests.
//!
//! `hostlet run` resolves entry classes against this registry, so any
//! module whose manifest names one of these classes can be run without
//! shipping native code:
//!
//! - `demo.Hello` shows a menu form, switches to a surface and asks to be
//!   terminated.
//! - `demo.Counter` draws frames on its own thread until it is destroyed.
//! - `demo.Broken` fails its startup hook.
//!
//! A module may also package its own classes as aliases of the demo guests,
//! one `com.acme.Game = demo.Counter` line per class in its packaged module
//! file. See [`Aliases`].

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hostlet_core::{
    ClassLoadError, CommandEntry, CommandKind, CommandListener, CommandSet, Displayable,
    GuestApplication, GuestContext, GuestError, GuestFactory, ModuleManifest,
};
use hostlet_isolation::{GuestRegistry, PackagedClasses};
use parking_lot::Mutex;
use tracing::{debug, info};

const STEP: Duration = Duration::from_millis(100);

/// Registry holding every demo guest.
pub fn registry() -> Arc<GuestRegistry> {
    let registry = Arc::new(GuestRegistry::new());
    registry.register_fn("demo.Hello", |context| {
        Ok(Arc::new(Hello::new(context)) as Arc<dyn GuestApplication>)
    });
    registry.register_fn("demo.Counter", |context| {
        Ok(Arc::new(Counter::new(context)) as Arc<dyn GuestApplication>)
    });
    registry.register_fn("demo.Broken", |_context| {
        Ok(Arc::new(Broken) as Arc<dyn GuestApplication>)
    });
    registry
}

/// Module-packaged classes declared as aliases of registered guests.
///
/// The packaged module file is read as text; lines of the form
/// `class = target` define `class`, everything else is skipped.
pub struct Aliases {
    registry: Arc<GuestRegistry>,
}

impl Aliases {
    /// Aliases whose targets resolve in `registry`.
    pub fn new(registry: Arc<GuestRegistry>) -> Self {
        Self { registry }
    }
}

impl PackagedClasses for Aliases {
    fn classes(
        &self,
        staged_module: &Path,
        _manifest: &ModuleManifest,
    ) -> Result<Vec<(String, GuestFactory)>, ClassLoadError> {
        let bytes = fs::read(staged_module).map_err(|e| ClassLoadError::Instantiation {
            class: staged_module.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut classes = Vec::new();
        for line in String::from_utf8_lossy(&bytes).lines() {
            let Some((class, target)) = line.split_once('=') else {
                continue;
            };
            let (class, target) = (class.trim(), target.trim());
            if class.is_empty() || class.starts_with('#') {
                continue;
            }
            let factory = self
                .registry
                .resolve(target)
                .ok_or_else(|| ClassLoadError::NotFound(target.to_string()))?;
            debug!(class, target, "packaged alias");
            classes.push((class.to_string(), factory));
        }
        Ok(classes)
    }
}

fn spawn_named<F>(name: &str, body: F) -> Result<JoinHandle<()>, GuestError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|e| GuestError::failed(format!("cannot spawn {}: {}", name, e)))
}

struct Hello {
    context: GuestContext,
    stop: Arc<AtomicBool>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Hello {
    fn new(context: GuestContext) -> Self {
        Self {
            context,
            stop: Arc::new(AtomicBool::new(false)),
            ticker: Mutex::new(None),
        }
    }

    fn menu(&self) -> Displayable {
        let greeting = self.context.property("Module-Vendor").map_or_else(
            || "Hello from hostlet".to_string(),
            |vendor| format!("Hello from {}", vendor),
        );
        let commands = CommandSet::builder()
            .command("Play", CommandKind::Screen, 1)
            .command("Quit", CommandKind::Exit, 2)
            .build();
        Displayable::form("Hello", [greeting])
            .with_commands(commands)
            .with_listener(Arc::new(HelloMenu {
                context: self.context.clone(),
            }))
    }
}

struct HelloMenu {
    context: GuestContext,
}

impl CommandListener for HelloMenu {
    fn command_action(&self, command: &CommandEntry, _displayable: &Displayable) {
        match command.kind {
            CommandKind::Exit => self.context.request_termination(),
            _ => self
                .context
                .display()
                .set_current(Arc::new(Displayable::surface("Canvas"))),
        }
    }
}

impl GuestApplication for Hello {
    fn start(&self) -> Result<(), GuestError> {
        self.context.display().set_current(Arc::new(self.menu()));

        let context = self.context.clone();
        let stop = Arc::clone(&self.stop);
        let ticker = spawn_named("hello-ticker", move || {
            thread::sleep(STEP);
            if stop.load(Ordering::Acquire) {
                return;
            }
            context
                .display()
                .set_current(Arc::new(Displayable::surface("Canvas")));
            thread::sleep(STEP);
            if !stop.load(Ordering::Acquire) {
                context.request_termination();
            }
        })?;
        *self.ticker.lock() = Some(ticker);
        Ok(())
    }

    fn destroy(&self) -> Result<(), GuestError> {
        self.stop.store(true, Ordering::Release);
        if let Some(ticker) = self.ticker.lock().take() {
            if ticker.join().is_err() {
                return Err(GuestError::failed("ticker thread panicked"));
            }
        }
        info!(namespace = %self.context.namespace(), "hello destroyed");
        Ok(())
    }
}

struct Counter {
    context: GuestContext,
    frames: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    painter: Mutex<Option<JoinHandle<()>>>,
}

impl Counter {
    fn new(context: GuestContext) -> Self {
        Self {
            context,
            frames: Arc::new(AtomicU64::new(0)),
            stop: Arc::new(AtomicBool::new(false)),
            painter: Mutex::new(None),
        }
    }
}

impl GuestApplication for Counter {
    fn start(&self) -> Result<(), GuestError> {
        self.context
            .display()
            .set_current(Arc::new(Displayable::surface("Counter")));

        let frames = Arc::clone(&self.frames);
        let stop = Arc::clone(&self.stop);
        let display = Arc::clone(self.context.display());
        let painter = spawn_named("counter-painter", move || {
            while !stop.load(Ordering::Acquire) {
                if display.is_host_visible() {
                    frames.fetch_add(1, Ordering::Relaxed);
                }
                thread::sleep(Duration::from_millis(10));
            }
        })?;
        *self.painter.lock() = Some(painter);
        Ok(())
    }

    fn pause(&self) {
        debug!(frames = self.frames.load(Ordering::Relaxed), "counter paused");
    }

    fn destroy(&self) -> Result<(), GuestError> {
        self.stop.store(true, Ordering::Release);
        if let Some(painter) = self.painter.lock().take() {
            if painter.join().is_err() {
                return Err(GuestError::failed("painter thread panicked"));
            }
        }
        let frames = self.frames.load(Ordering::Relaxed);
        if let Some(scratch) = self.context.scratch_dir() {
            fs::write(scratch.join("frames"), frames.to_string())
                .map_err(|e| GuestError::failed(format!("cannot save frames: {}", e)))?;
        }
        info!(frames, "counter stopped");
        Ok(())
    }
}

struct Broken;

impl GuestApplication for Broken {
    fn start(&self) -> Result<(), GuestError> {
        Err(GuestError::failed("demo guest refuses to start"))
    }

    fn destroy(&self) -> Result<(), GuestError> {
        Ok(())
    }
}
