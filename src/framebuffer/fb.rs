//! Framebuffer Device Wrapper
//!
//! Writes whole frames to a Linux framebuffer device node (`/dev/fb0`) with a
//! single buffered write per frame. On open the device geometry is queried
//! with the `FBIOGET_*SCREENINFO` ioctls so a frame that cannot fit in the
//! device memory is rejected up front.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use super::frame::Frame;
use super::geometry::Screen;
use crate::error::DisplayError;

/// IOCTL constants for framebuffer
const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;

/// Variable screen info structure
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbVarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitField,
    green: FbBitField,
    blue: FbBitField,
    transp: FbBitField,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    // Timing info (unused, keeps the struct size right)
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbBitField {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// Fixed screen info structure
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FbFixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    fb_type: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

/// Geometry reported by the framebuffer driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceGeometry {
    pub xres: u32,
    pub yres: u32,
    pub bits_per_pixel: u32,
    pub line_length: u32,
    pub smem_len: u32,
}

/// Something a finished frame can be shown on
pub trait Surface {
    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

/// Framebuffer device handle
pub struct Framebuffer {
    path: PathBuf,
    /// Persistent handle; `None` when reopening on every frame
    file: Option<File>,
    geometry: Option<DeviceGeometry>,
    frames_written: u64,
}

impl Framebuffer {
    /// Open the framebuffer device and check that a `screen` frame fits.
    ///
    /// With `reopen_each_frame` the handle used for the probe is dropped and
    /// every `present` opens the device again.
    pub fn open(
        path: impl AsRef<Path>,
        screen: Screen,
        reopen_each_frame: bool,
    ) -> Result<Self, DisplayError> {
        let path = path.as_ref().to_path_buf();
        let file = open_device(&path)?;

        let geometry = query_geometry(&file);
        match geometry {
            Some(geometry) => {
                info!(
                    path = %path.display(),
                    xres = geometry.xres,
                    yres = geometry.yres,
                    bpp = geometry.bits_per_pixel,
                    stride = geometry.line_length,
                    smem_len = geometry.smem_len,
                    "Framebuffer opened"
                );
                check_fits(&path, screen, geometry)?;
            }
            None => {
                info!(path = %path.display(), "Display opened (no framebuffer geometry available)");
            }
        }

        Ok(Self {
            path,
            file: if reopen_each_frame { None } else { Some(file) },
            geometry,
            frames_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn geometry(&self) -> Option<DeviceGeometry> {
        self.geometry
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => {
                file.seek(SeekFrom::Start(0))?;
                file.write_all(bytes)?;
                file.flush()
            }
            None => {
                let mut file = OpenOptions::new().write(true).open(&self.path)?;
                file.write_all(bytes)?;
                file.flush()
            }
        }
    }
}

impl Surface for Framebuffer {
    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.write_frame(frame.as_bytes())
            .map_err(|source| DisplayError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.frames_written += 1;
        trace!(frames = self.frames_written, "Frame presented");
        Ok(())
    }
}

fn open_device(path: &Path) -> Result<File, DisplayError> {
    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| DisplayError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Query var/fix screen info. `None` when the node is not a framebuffer.
fn query_geometry(file: &File) -> Option<DeviceGeometry> {
    let fd = file.as_raw_fd();

    let mut var_info: FbVarScreenInfo = Default::default();
    let ret = unsafe { libc::ioctl(fd, FBIOGET_VSCREENINFO as _, &mut var_info) };
    if ret < 0 {
        debug!(
            error = %io::Error::last_os_error(),
            "FBIOGET_VSCREENINFO failed, skipping geometry check"
        );
        return None;
    }

    let mut fix_info: FbFixScreenInfo = Default::default();
    let ret = unsafe { libc::ioctl(fd, FBIOGET_FSCREENINFO as _, &mut fix_info) };
    if ret < 0 {
        debug!(
            error = %io::Error::last_os_error(),
            "FBIOGET_FSCREENINFO failed, skipping geometry check"
        );
        return None;
    }

    Some(DeviceGeometry {
        xres: var_info.xres,
        yres: var_info.yres,
        bits_per_pixel: var_info.bits_per_pixel,
        line_length: fix_info.line_length,
        smem_len: fix_info.smem_len,
    })
}

fn check_fits(path: &Path, screen: Screen, geometry: DeviceGeometry) -> Result<(), DisplayError> {
    let required = screen.frame_len();
    let available = geometry.smem_len as usize;

    if available < required {
        return Err(DisplayError::SizeMismatch {
            path: path.to_path_buf(),
            required,
            available,
        });
    }

    if available != required {
        warn!(
            required = required,
            available = available,
            "Frame is smaller than framebuffer memory, only the start is rewritten"
        );
    }

    Ok(())
}
