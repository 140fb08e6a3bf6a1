use std::fmt;
use std::str::FromStr;

use crate::error::InventoryError;

macro_rules! entities {
    ($($variant:ident => $name:literal,)+) => {
        /// Management classes the engine is authorized to query.
        ///
        /// Anything outside this list is rejected before a query is issued.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Entity {
            $($variant,)+
        }

        impl Entity {
            pub const ALL: &'static [Entity] = &[$(Entity::$variant,)+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Entity::$variant => $name,)+
                }
            }
        }
    };
}

entities! {
    ComputerSystem => "Win32_ComputerSystem",
    ComputerSystemProduct => "Win32_ComputerSystemProduct",
    SystemEnclosure => "Win32_SystemEnclosure",
    BaseBoard => "Win32_BaseBoard",
    Bios => "Win32_BIOS",
    Processor => "Win32_Processor",
    PhysicalMemory => "Win32_PhysicalMemory",
    Bus => "Win32_Bus",
    PnpEntity => "Win32_PnPEntity",
    IdeController => "Win32_IDEController",
    IdeControllerDevice => "Win32_IDEControllerDevice",
    ScsiController => "Win32_SCSIController",
    ScsiControllerDevice => "Win32_SCSIControllerDevice",
    DiskDrive => "Win32_DiskDrive",
    DiskDriveToDiskPartition => "Win32_DiskDriveToDiskPartition",
    DiskPartition => "Win32_DiskPartition",
    LogicalDiskToPartition => "Win32_LogicalDiskToPartition",
    LogicalDisk => "Win32_LogicalDisk",
    CdromDrive => "Win32_CDROMDrive",
    UsbController => "Win32_USBController",
    UsbControllerDevice => "Win32_USBControllerDevice",
    VideoController => "Win32_VideoController",
    NetworkAdapter => "Win32_NetworkAdapter",
    SoundDevice => "Win32_SoundDevice",
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entity {
    type Err = InventoryError;

    /// Class names compare case-insensitively, as the management service does.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|entity| entity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InventoryError::UnauthorizedEntity(s.to_owned()))
    }
}
