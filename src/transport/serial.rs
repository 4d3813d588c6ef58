//! # Serial Transport
//!
//! Talks to a receipt printer attached through a serial port or a USB
//! serial adapter (`/dev/ttyUSB0`, `/dev/ttyS0`).
//!
//! ## TTY Configuration
//!
//! The device is opened write-only and switched to raw mode so binary data
//! reaches the printer unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR,
//!   ICRNL off
//! - **No software flow control**: IXON, IXOFF, IXANY off. 0x11 and 0x13
//!   show up in raster data all the time.
//! - **No output processing**: OPOST off (no LF → CR LF)
//! - **8N1**: CS8, no parity
//! - **No echo, non-canonical**: ECHO, ECHONL, ICANON, ISIG, IEXTEN off
//!
//! Input and output speed are both set to the configured baud rate.
//!
//! ## Chunked Writes
//!
//! Writes go out in chunks of at most 4096 bytes with a short pause after
//! each one, which keeps slow devices from dropping bytes when their
//! receive buffer fills.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::MissiveError;

/// Default serial device
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default baud rate (TM-T88III factory setting)
pub const DEFAULT_BAUD: u32 = 38400;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Serial Printer Transport
///
/// ```no_run
/// use std::io::Write;
/// use missive::transport::SerialTransport;
/// use missive::protocol::commands;
///
/// let mut transport = SerialTransport::open("/dev/ttyUSB0", 38400)?;
/// transport.write_all(&commands::init())?;
/// transport.flush()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SerialTransport {
    file: File,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl SerialTransport {
    /// Open `device` and configure it for raw output at `baud`.
    ///
    /// ## Errors
    ///
    /// - The device doesn't exist or permission is denied (the user may need
    ///   to be in the `dialout` group)
    /// - The baud rate is not one of [`supported_bauds`]
    /// - The device is not a TTY
    pub fn open<P: AsRef<Path>>(device: P, baud: u32) -> Result<Self, MissiveError> {
        let path = device.as_ref();
        let speed = baud_constant(baud)?;

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            MissiveError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(file.as_raw_fd(), speed)?;

        Ok(Self {
            file,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Open the default device at the default baud rate.
    pub fn open_default() -> Result<Self, MissiveError> {
        Self::open(DEFAULT_DEVICE, DEFAULT_BAUD)
    }

    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }
}

impl Write for SerialTransport {
    /// Writes at most one chunk, then pauses.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len().min(self.chunk_size);
        let written = self.file.write(&buf[..len])?;
        if written > 0 && !self.chunk_delay.is_zero() {
            thread::sleep(self.chunk_delay);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Baud rates [`SerialTransport::open`] accepts.
pub fn supported_bauds() -> &'static [u32] {
    &[2400, 4800, 9600, 19200, 38400, 57600, 115200]
}

fn baud_constant(baud: u32) -> Result<libc::speed_t, MissiveError> {
    let speed = match baud {
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        other => {
            return Err(MissiveError::Transport(format!(
                "Unsupported baud rate {} (supported: {:?})",
                other,
                supported_bauds()
            )));
        }
    };
    Ok(speed)
}

/// Put a TTY into raw 8N1 mode at `speed`.
fn configure_tty_raw(fd: i32, speed: libc::speed_t) -> Result<(), MissiveError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    // SAFETY: tcgetattr fills the struct on success, checked below.
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(MissiveError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    // SAFETY: initialised by the successful tcgetattr above.
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8 | libc::CLOCAL;

    // SAFETY: termios is a valid, initialised struct.
    let speed_ok = unsafe {
        libc::cfsetispeed(&mut termios, speed) == 0 && libc::cfsetospeed(&mut termios, speed) == 0
    };
    if !speed_ok {
        return Err(MissiveError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    // SAFETY: fd is open for the lifetime of this call.
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(MissiveError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
