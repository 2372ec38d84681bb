use std::fmt;

#[derive(Debug, PartialEq)]
pub enum SchtasksError {
    NoTaskName,
    UserConflict,
    PasswordWithoutUser,
    EncodeTask,
    TempFile,
    ReadFile,
    WriteFile,
    Spawn,
    OutputParse,
}

impl std::error::Error for SchtasksError {}

impl fmt::Display for SchtasksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchtasksError::NoTaskName => write!(f, "task name is empty"),
            SchtasksError::UserConflict => {
                write!(f, "cannot register as SYSTEM and a named user at once")
            }
            SchtasksError::PasswordWithoutUser => {
                write!(f, "password supplied without a user account")
            }
            SchtasksError::EncodeTask => write!(f, "could not encode task to XML"),
            SchtasksError::TempFile => write!(f, "could not stage temporary task file"),
            SchtasksError::ReadFile => write!(f, "could not read task file"),
            SchtasksError::WriteFile => write!(f, "could not write task file"),
            SchtasksError::Spawn => write!(f, "could not spawn schtasks"),
            SchtasksError::OutputParse => write!(f, "could not parse schtasks output"),
        }
    }
}
