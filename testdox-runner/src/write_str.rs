// Copyright (c) The testdox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The output sink the reporter writes rendered lines to.
//!
//! Reporter output is always valid UTF-8, and callers may want to collect it
//! into a `String` (tests) or stream it to a terminal. [`WriteStr`] abstracts
//! over both while reporting failures as [`std::io::Error`].

use std::{
    fmt,
    io::{self, BufWriter, Write},
};

/// An append-only sink for text.
///
/// For more, see the [module-level documentation](self).
pub trait WriteStr {
    /// Appends a string to the sink.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Flushes any intermediately buffered text to its destination.
    fn write_str_flush(&mut self) -> io::Result<()>;

    /// Appends formatted text to the sink.
    ///
    /// This makes `write!` and `writeln!` usable on any `WriteStr`.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        // Fast path: a plain string literal needs no formatting machinery.
        if let Some(s) = args.as_str() {
            return self.write_str(s);
        }

        struct Adapter<'a, T: ?Sized> {
            inner: &'a mut T,
            error: Option<io::Error>,
        }

        impl<T: ?Sized + WriteStr> fmt::Write for Adapter<'_, T> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.inner.write_str(s).map_err(|error| {
                    self.error = Some(error);
                    fmt::Error
                })
            }
        }

        let mut adapter = Adapter {
            inner: self,
            error: None,
        };
        fmt::write(&mut adapter, args).map_err(|_| {
            adapter
                .error
                .take()
                .unwrap_or_else(|| io::Error::other("formatter error"))
        })
    }
}

impl WriteStr for String {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn write_str_flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> WriteStr for BufWriter<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_all(s.as_bytes())
    }

    fn write_str_flush(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<T: WriteStr + ?Sized> WriteStr for &mut T {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn write_str_flush(&mut self) -> io::Result<()> {
        (**self).write_str_flush()
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        (**self).write_fmt(args)
    }
}
