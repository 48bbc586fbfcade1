//! Stdio-backed serial port
//!
//! Gives the console the same non-blocking receive it has on hardware: a
//! pump thread moves stdin into a channel, and `read_ready` reflects
//! whether bytes are waiting, so the scheduler tick never blocks on input.

use std::io::{self, Read as _, Write as _};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Serial port emulation over stdin/stdout.
pub struct StdioPort {
    rx: Receiver<u8>,
    pending: Option<u8>,
    eof: bool,
    stdout: io::Stdout,
}

impl StdioPort {
    /// Spawn the stdin pump. With `translate` set, terminal line feeds are
    /// delivered as the protocol's `\r` terminator.
    pub fn open(translate: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut buf = [0u8; 256];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        for &b in &buf[..n] {
                            let b = if translate && b == b'\n' { b'\r' } else { b };
                            if tx.send(b).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });
        Self {
            rx,
            pending: None,
            eof: false,
            stdout: io::stdout(),
        }
    }

    /// True once stdin has closed and the channel is drained.
    pub fn at_eof(&self) -> bool {
        self.eof
    }
}

impl embedded_io::ErrorType for StdioPort {
    type Error = io::Error;
}

impl embedded_io::ReadReady for StdioPort {
    fn read_ready(&mut self) -> io::Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        if self.eof {
            return Ok(false);
        }
        match self.rx.try_recv() {
            Ok(b) => {
                self.pending = Some(b);
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => {
                self.eof = true;
                Ok(false)
            }
        }
    }
}

impl embedded_io::Read for StdioPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(b) = self.pending.take() {
            buf[0] = b;
            return Ok(1);
        }
        if self.eof {
            return Ok(0);
        }
        match self.rx.recv() {
            Ok(b) => {
                buf[0] = b;
                Ok(1)
            }
            Err(_) => {
                self.eof = true;
                Ok(0)
            }
        }
    }
}

impl embedded_io::Write for StdioPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.write_all(buf)?;
        // echo must reach the terminal immediately, not sit in the buffer
        self.stdout.flush()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}
