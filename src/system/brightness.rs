//! Drives a Linux backlight sysfs node, implementing
//! [crate::core::collaborators::BrightnessControl].
//!
//! A direct write to `/sys/class/backlight/<device>/brightness`. Only the
//! shape of the collaborator trait matters to the state machine, so a more
//! elaborate backend (DRM properties, a D-Bus round-trip through logind)
//! can replace this one without touching it.

use crate::core::collaborators::BrightnessControl;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

const DIM_FRACTION: f64 = 0.2;

pub struct SysfsBrightness {
    device_path: PathBuf,
    max_brightness: u32,
    normal_brightness: Mutex<u32>,
}

impl SysfsBrightness {
    pub fn new(device: &str) -> anyhow::Result<SysfsBrightness> {
        let device_path = PathBuf::from("/sys/class/backlight").join(device);
        let max_brightness = Self::read_u32(&device_path.join("max_brightness"))?;
        let current = Self::read_u32(&device_path.join("brightness")).unwrap_or(max_brightness);
        Ok(SysfsBrightness {
            device_path,
            max_brightness,
            normal_brightness: Mutex::new(current.max(1)),
        })
    }

    fn read_u32(path: &std::path::Path) -> anyhow::Result<u32> {
        Ok(fs::read_to_string(path)?.trim().parse()?)
    }

    fn write(&self, value: u32) {
        let path = self.device_path.join("brightness");
        if let Err(e) = fs::write(&path, value.to_string()) {
            log::error!("failed to write brightness {} to {:?}: {}", value, path, e);
        }
    }
}

impl BrightnessControl for SysfsBrightness {
    fn set_off_brightness(&self) {
        log::debug!("setting backlight off");
        self.write(0);
    }

    fn set_dim_brightness(&self) {
        let normal = *self.normal_brightness.lock().unwrap();
        let dim = ((normal as f64) * DIM_FRACTION) as u32;
        log::debug!("dimming backlight to {}", dim);
        self.write(dim);
    }

    fn set_normal_brightness(&self) {
        let normal = *self.normal_brightness.lock().unwrap();
        log::debug!("restoring backlight to {}", normal);
        self.write(normal.min(self.max_brightness));
    }
}
