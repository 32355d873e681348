use core::convert::TryFrom;

pub trait OpCode {
    fn op_code(&self) -> u8;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    MatchRom = 0x55,
    SkipRom = 0xCC,
    SearchRom = 0xF0,
    ReadRom = 0x33,
    AlarmSearch = 0xEC,
    ConvertT = 0x44,
    WriteScratch = 0x4E,
    ReadScratch = 0xBE,
    CopyScratch = 0x48,
    RecallEe = 0xB8,
    ReadPowerSupply = 0xB4,
}

/// How long a command may keep the device busy after it was issued
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Busy {
    Conversion,
    Eeprom,
}

impl Command {
    /// ROM commands address devices, function commands talk to the addressed ones
    pub fn is_rom_command(&self) -> bool {
        matches!(
            self,
            Command::MatchRom
                | Command::SkipRom
                | Command::SearchRom
                | Command::ReadRom
                | Command::AlarmSearch
        )
    }

    pub(crate) fn busy(&self) -> Option<Busy> {
        match self {
            Command::ConvertT => Some(Busy::Conversion),
            Command::CopyScratch | Command::RecallEe => Some(Busy::Eeprom),
            _ => None,
        }
    }
}

impl OpCode for Command {
    fn op_code(&self) -> u8 {
        *self as _
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(op_code: u8) -> Result<Self, Self::Error> {
        Ok(match op_code {
            0x55 => Command::MatchRom,
            0xCC => Command::SkipRom,
            0xF0 => Command::SearchRom,
            0x33 => Command::ReadRom,
            0xEC => Command::AlarmSearch,
            0x44 => Command::ConvertT,
            0x4E => Command::WriteScratch,
            0xBE => Command::ReadScratch,
            0x48 => Command::CopyScratch,
            0xB8 => Command::RecallEe,
            0xB4 => Command::ReadPowerSupply,
            other => return Err(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Busy, Command, OpCode};
    use core::convert::TryFrom;

    const ALL: [Command; 11] = [
        Command::MatchRom,
        Command::SkipRom,
        Command::SearchRom,
        Command::ReadRom,
        Command::AlarmSearch,
        Command::ConvertT,
        Command::WriteScratch,
        Command::ReadScratch,
        Command::CopyScratch,
        Command::RecallEe,
        Command::ReadPowerSupply,
    ];

    #[test]
    fn op_codes_map_back() {
        for cmd in ALL {
            assert_eq!(Command::try_from(cmd.op_code()), Ok(cmd));
        }
        assert_eq!(Command::try_from(0x00), Err(0x00));
    }

    #[test]
    fn rom_and_function_commands() {
        let rom = ALL.iter().filter(|c| c.is_rom_command()).count();
        assert_eq!(rom, 5);
        assert!(!Command::ReadScratch.is_rom_command());
        assert_eq!(Command::ConvertT.busy(), Some(Busy::Conversion));
        assert_eq!(Command::CopyScratch.busy(), Some(Busy::Eeprom));
        assert_eq!(Command::ReadScratch.busy(), None);
    }
}
