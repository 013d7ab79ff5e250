// Shuttlers Device Reader
// Exclusive evdev access to the jog/shuttle device, one read per frame

use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use evdev::Device;

use super::frame::{EventFrame, RawEvent, MAX_FRAME_EVENTS};
use crate::output::VIRTUAL_DEVICE_NAME;

/// Where udev publishes stable device names
pub const BY_ID_DIR: &str = "/dev/input/by-id";

/// Errors that can occur while reading the device
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to grab {path}: {source}")]
    Grab {
        path: String,
        source: std::io::Error,
    },
}

/// Returns true for a `/dev/input/by-id` entry naming a Contour Shuttle
/// event interface (`usb-*Shuttle*-event-if*`).
pub fn is_shuttle_node(file_name: &str) -> bool {
    file_name.starts_with("usb-")
        && file_name.contains("Shuttle")
        && file_name.contains("-event-if")
}

/// Convert a poll timeout for libc::poll (-1 = infinite)
fn timeout_ms(timeout: Option<Duration>) -> i32 {
    match timeout {
        None => -1,
        Some(timeout) => {
            let ms = timeout.as_nanos().div_ceil(1_000_000);
            ms.min(i32::MAX as u128) as i32
        }
    }
}

/// An open, exclusively grabbed jog/shuttle device.
///
/// Devices are ungrabbed on drop so the hardware is handed back to the
/// system even when the loop exits early.
pub struct ShuttleDevice {
    device: Device,
    path: PathBuf,
    grabbed: bool,
}

impl ShuttleDevice {
    /// Find the device node
    ///
    /// Looks for a `usb-*Shuttle*-event-if*` link first, then for any event
    /// device whose name mentions "Shuttle".
    pub fn discover() -> Result<PathBuf, DeviceError> {
        if let Ok(entries) = std::fs::read_dir(BY_ID_DIR) {
            let mut nodes: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .map(is_shuttle_node)
                        .unwrap_or(false)
                })
                .map(|entry| entry.path())
                .collect();
            nodes.sort();
            if let Some(node) = nodes.into_iter().next() {
                return Ok(node);
            }
        }

        for (path, device) in evdev::enumerate() {
            let name = device.name().unwrap_or("");
            if name.contains("Shuttle") && !name.starts_with(VIRTUAL_DEVICE_NAME) {
                return Ok(path);
            }
        }

        Err(DeviceError::NotFound(format!(
            "no Shuttle device under {} or in /dev/input",
            BY_ID_DIR
        )))
    }

    /// Open and grab the device at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DeviceError> {
        let path = path.as_ref().to_path_buf();
        let mut device = Device::open(&path)?;

        // A crashed previous instance may still hold the grab
        let _ = device.ungrab();
        device.grab().map_err(|source| DeviceError::Grab {
            path: path.display().to_string(),
            source,
        })?;

        log::info!(
            "Opened {} ({})",
            device.name().unwrap_or("Unknown"),
            path.display()
        );
        Ok(Self {
            device,
            path,
            grabbed: true,
        })
    }

    /// Node this device was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Device name reported by the kernel
    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("Unknown")
    }

    /// Wait up to `timeout` and read one frame (`None` waits forever)
    ///
    /// Returns `Ok(None)` on timeout or when a signal interrupted the wait.
    /// A single read returns at most `MAX_FRAME_EVENTS` sub-events.
    pub fn read_frame(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<EventFrame>, DeviceError> {
        let fd = self.device.as_raw_fd();
        let mut poll_fd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };

        let poll_result = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms(timeout)) };
        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(None);
            }
            return Err(DeviceError::Io(err));
        }
        if poll_result == 0 {
            return Ok(None);
        }

        let mut raw: [libc::input_event; MAX_FRAME_EVENTS] = unsafe { std::mem::zeroed() };
        let size = std::mem::size_of::<libc::input_event>();
        let n = unsafe {
            libc::read(
                fd,
                raw.as_mut_ptr() as *mut libc::c_void,
                size * MAX_FRAME_EVENTS,
            )
        };
        if n < 0 {
            let err = std::io::Error::last_os_error();
            if matches!(
                err.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
            ) {
                return Ok(None);
            }
            return Err(DeviceError::Io(err));
        }
        if n == 0 {
            return Err(DeviceError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "device closed",
            )));
        }

        let count = n as usize / size;
        let frame = raw[..count]
            .iter()
            .map(|ev| RawEvent::new(ev.type_, ev.code, ev.value))
            .collect();
        Ok(Some(frame))
    }

    /// Release the exclusive grab
    pub fn ungrab(&mut self) {
        if self.grabbed {
            let _ = self.device.ungrab();
            self.grabbed = false;
        }
    }
}

impl Drop for ShuttleDevice {
    fn drop(&mut self) {
        self.ungrab();
    }
}
