//! Request serial numbers and their allocation.

use std::fmt;

/// Caller-assigned integer correlating a request with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Serial(i32);

impl Serial {
    /// Wrap a raw serial value.
    ///
    /// # Examples
    ///
    /// ```
    /// use rilbridge::serial::Serial;
    ///
    /// let serial = Serial::new(42);
    /// assert_eq!(serial.as_i32(), 42);
    /// ```
    #[must_use]
    pub const fn new(value: i32) -> Self { Self(value) }

    /// Return the raw serial value.
    #[must_use]
    pub const fn as_i32(self) -> i32 { self.0 }
}

impl From<i32> for Serial {
    fn from(value: i32) -> Self { Self(value) }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "[{:04}]", self.0) }
}

/// Monotonic serial generator. Wraps at `i32::MAX`.
#[derive(Debug, Default)]
pub struct SerialAllocator {
    next: i32,
}

impl SerialAllocator {
    /// Create an allocator whose first serial is `start`.
    #[must_use]
    pub const fn starting_at(start: i32) -> Self { Self { next: start } }

    /// Hand out the next serial.
    pub const fn allocate(&mut self) -> Serial {
        let serial = Serial(self.next);
        self.next = self.next.wrapping_add(1);
        serial
    }
}
