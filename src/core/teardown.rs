//! Process-wide terminal restoration.
//!
//! Raw mode must never outlive the process. The hooks installed here restore
//! the original terminal mode on normal exit (`atexit`), on panic, and on
//! `SIGTERM`/`SIGHUP`/`SIGQUIT`. While raw mode is held, `SIGINT` is turned
//! into a flag that the read loop consumes as an interrupt event; otherwise
//! it keeps its default action.
//!
//! Installation happens at most once per process through [`register_once`].
//! Restoration happens at most once per raw-mode activation: every path goes
//! through the `RAW_ENABLED` swap.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once, OnceLock};

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::{execute, terminal};
use tracing::{debug, warn};

static REGISTER: Once = Once::new();

/// Number of times the hooks were installed
static REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

/// Set while this process holds the terminal in raw mode
static RAW_ENABLED: AtomicBool = AtomicBool::new(false);

/// Raised by the SIGINT handler, cleared by the read loop
static INTERRUPT: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Terminal attributes captured before the first switch to raw mode
#[cfg(unix)]
static ORIGINAL_TERMIOS: OnceLock<libc::termios> = OnceLock::new();

/// Bytes of `DisableBracketedPaste`, written directly from signal handlers
#[cfg(unix)]
const PASTE_OFF: &[u8] = b"\x1b[?2004l";

/// Install exit, panic and signal hooks. Later calls are no-ops.
pub fn register_once() {
    REGISTER.call_once(|| {
        install_panic_hook();
        #[cfg(unix)]
        install_unix_hooks();
        REGISTRATIONS.fetch_add(1, Ordering::SeqCst);
        debug!("terminal teardown hooks installed");
    });
}

/// Record that raw mode is now active
pub(crate) fn mark_raw() {
    RAW_ENABLED.store(true, Ordering::SeqCst);
}

/// Switch bracketed paste reporting on or off
pub(crate) fn set_bracketed_paste<W: Write>(out: &mut W, enabled: bool) -> io::Result<()> {
    if enabled {
        execute!(out, EnableBracketedPaste)
    } else {
        execute!(out, DisableBracketedPaste)
    }
}

/// Leave raw mode if this process entered it.
///
/// Safe to call any number of times; only the first call after raw mode was
/// entered touches the terminal.
pub fn restore_terminal() -> io::Result<()> {
    restore_with(&mut io::stdout())
}

fn restore_with<W: Write>(out: &mut W) -> io::Result<()> {
    if RAW_ENABLED.swap(false, Ordering::SeqCst) {
        let paste = set_bracketed_paste(out, false);
        terminal::disable_raw_mode()?;
        paste?;
        debug!("terminal mode restored");
    }
    Ok(())
}

/// Whether raw mode is currently held
pub fn is_raw() -> bool {
    RAW_ENABLED.load(Ordering::SeqCst)
}

/// Consume a pending external interrupt
pub(crate) fn take_interrupt() -> bool {
    INTERRUPT
        .get()
        .map(|flag| flag.swap(false, Ordering::SeqCst))
        .unwrap_or(false)
}

/// Capture the terminal attributes of stdin once, for signal-time restore
#[cfg(unix)]
pub(crate) fn snapshot_termios() {
    if ORIGINAL_TERMIOS.get().is_some() {
        return;
    }
    // SAFETY: tcgetattr only writes into the zeroed struct we own.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(libc::STDIN_FILENO, &mut termios) == 0 {
            let _ = ORIGINAL_TERMIOS.set(termios);
        } else {
            warn!("tcgetattr failed: {}", io::Error::last_os_error());
        }
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        previous(info);
    }));
}

#[cfg(unix)]
extern "C" fn restore_at_exit() {
    let _ = restore_terminal();
}

/// Async-signal-safe restore: an atomic swap, `write` and `tcsetattr` only
#[cfg(unix)]
fn restore_from_signal() {
    if RAW_ENABLED.swap(false, Ordering::SeqCst) {
        // SAFETY: write and tcsetattr are async-signal-safe; both read
        // fully initialized memory.
        unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                PASTE_OFF.as_ptr() as *const libc::c_void,
                PASTE_OFF.len(),
            );
            if let Some(termios) = ORIGINAL_TERMIOS.get() {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, termios);
            }
        }
    }
}

/// Raise `flag` if raw mode is held. Returns false when the signal should
/// take its default action instead.
#[cfg(unix)]
fn capture_interrupt(raw: &AtomicBool, flag: &AtomicBool) -> bool {
    if raw.load(Ordering::SeqCst) {
        flag.store(true, Ordering::SeqCst);
        true
    } else {
        false
    }
}

#[cfg(unix)]
fn install_unix_hooks() {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::low_level;

    // SAFETY: restore_at_exit is a plain extern "C" fn with no arguments.
    if unsafe { libc::atexit(restore_at_exit) } != 0 {
        warn!("failed to register atexit terminal restore");
    }

    let flag = Arc::clone(INTERRUPT.get_or_init(|| Arc::new(AtomicBool::new(false))));
    // SAFETY: the handler only touches atomics, or terminates the process
    // through the default disposition.
    let registered = unsafe {
        low_level::register(SIGINT, move || {
            if !capture_interrupt(&RAW_ENABLED, &flag) {
                let _ = low_level::emulate_default_handler(SIGINT);
            }
        })
    };
    if let Err(e) = registered {
        warn!("failed to register SIGINT handler: {}", e);
    }

    for signal in [SIGTERM, SIGHUP, SIGQUIT] {
        // SAFETY: the handler only performs async-signal-safe operations
        // before re-raising the signal with its default disposition.
        let registered = unsafe {
            low_level::register(signal, move || {
                restore_from_signal();
                let _ = low_level::emulate_default_handler(signal);
            })
        };
        if let Err(e) = registered {
            warn!("failed to register handler for signal {}: {}", signal, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Serializes tests that touch the process-wide raw flag
    static GLOBAL_STATE: Mutex<()> = Mutex::new(());

    fn lock() -> MutexGuard<'static, ()> {
        GLOBAL_STATE.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_restore_without_raw_is_noop() {
        let _guard = lock();
        assert!(!is_raw());
        let mut out = Vec::new();
        restore_with(&mut out).unwrap();
        assert!(!is_raw());
        assert!(out.is_empty());
    }

    #[test]
    fn test_no_interrupt_pending_by_default() {
        let _guard = lock();
        assert!(!take_interrupt());
    }

    #[test]
    fn test_bracketed_paste_sequences() {
        let mut out = Vec::new();
        set_bracketed_paste(&mut out, true).unwrap();
        assert_eq!(out, b"\x1b[?2004h");

        out.clear();
        set_bracketed_paste(&mut out, false).unwrap();
        assert_eq!(out, b"\x1b[?2004l");
    }

    #[test]
    fn test_restore_runs_once_per_activation() {
        let _guard = lock();
        mark_raw();
        assert!(is_raw());

        let mut out = Vec::new();
        restore_with(&mut out).unwrap();
        assert!(!is_raw());
        assert_eq!(out, b"\x1b[?2004l");

        restore_with(&mut out).unwrap();
        assert_eq!(out, b"\x1b[?2004l");
    }

    #[cfg(unix)]
    #[test]
    fn test_interrupt_captured_only_in_raw_mode() {
        let raw = AtomicBool::new(false);
        let flag = AtomicBool::new(false);
        assert!(!capture_interrupt(&raw, &flag));
        assert!(!flag.load(Ordering::SeqCst));

        raw.store(true, Ordering::SeqCst);
        assert!(capture_interrupt(&raw, &flag));
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_register_once_installs_hooks_once() {
        static BASE_HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

        let _guard = lock();
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            BASE_HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
            default_hook(info);
        }));

        register_once();
        register_once();
        assert_eq!(REGISTRATIONS.load(Ordering::SeqCst), 1);

        // The installed hook restores the terminal, then chains once
        mark_raw();
        let result = std::panic::catch_unwind(|| panic!("editor crashed"));
        assert!(result.is_err());
        assert!(!is_raw());
        assert_eq!(BASE_HOOK_CALLS.load(Ordering::SeqCst), 1);
    }
}
