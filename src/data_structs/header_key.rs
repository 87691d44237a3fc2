use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

/// Canonical instrument context of a sequencing sample.
///
/// Renders as `Device=D[:Run=R][:Flowcell=F][:Lane=L]`. A degraded key has
/// no instrument fields and carries the platform accession as its device,
/// so it renders as `Device=<platform>`.
///
/// The degraded flag takes part in equality, so a degraded key never
/// collides with a usable key for a device that happens to share the
/// platform's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeaderKey {
    device:   String,
    run:      Option<String>,
    flowcell: Option<String>,
    lane:     Option<String>,
    degraded: bool,
}

impl HeaderKey {
    pub fn new(
        device: impl Into<String>,
        run: Option<String>,
        flowcell: Option<String>,
        lane: Option<String>,
    ) -> Self {
        Self {
            device: device.into(),
            run,
            flowcell,
            lane,
            degraded: false,
        }
    }

    /// Key for device and lane only (legacy five-field headers).
    pub fn device_lane(
        device: impl Into<String>,
        lane: impl Into<String>,
    ) -> Self {
        Self::new(device, None, None, Some(lane.into()))
    }

    /// Fallback when no instrument fields could be read.
    pub fn platform_only(platform: impl Into<String>) -> Self {
        Self {
            device:   platform.into(),
            run:      None,
            flowcell: None,
            lane:     None,
            degraded: true,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn run(&self) -> Option<&str> {
        self.run.as_deref()
    }

    pub fn flowcell(&self) -> Option<&str> {
        self.flowcell.as_deref()
    }

    pub fn lane(&self) -> Option<&str> {
        self.lane.as_deref()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Drops the most specific field present (lane, then flowcell, then
    /// run). Returns `None` when only the device is left.
    pub fn drop_resolution(&self) -> Option<Self> {
        let mut coarser = self.clone();
        if coarser.lane.take().is_some()
            || coarser.flowcell.take().is_some()
            || coarser.run.take().is_some()
        {
            Some(coarser)
        }
        else {
            None
        }
    }
}

impl Display for HeaderKey {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Device={}", self.device)?;
        if let Some(run) = &self.run {
            write!(f, ":Run={}", run)?;
        }
        if let Some(flowcell) = &self.flowcell {
            write!(f, ":Flowcell={}", flowcell)?;
        }
        if let Some(lane) = &self.lane {
            write!(f, ":Lane={}", lane)?;
        }
        Ok(())
    }
}
