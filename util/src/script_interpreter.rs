//! # Command script interpreter module
//!
//! This module provides an interpreter for timed command scripts, allowing
//! externally raised commands to be replayed against the simulation clock.
//! Each line of a script has the form `<time_s>: <json>;`, where the payload
//! is the JSON serialisation of the command type.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct TimedCmd<C> {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command to run
    cmd: C
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of commands that need executing.
pub struct ScriptInterpreter<C> {
    _script_path: PathBuf,
    cmds: VecDeque<TimedCmd<C>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, serde_json::Error)
}

pub enum PendingCmds<C> {
    None,
    Some(Vec<C>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: DeserializeOwned> ScriptInterpreter<C> {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.to_str().unwrap().to_string()));
        }

        // Load the script into a string
        let script = match fs::read_to_string(script_path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e))
        };

        // Empty queue of commands
        let mut cmd_queue: VecDeque<TimedCmd<C>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        let mut num_caps = 0;

        for cap in re.captures_iter(&script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => return Err(
                    ScriptError::InvalidTimestamp(format!("{}", e)))
            };

            // Parse the command from the payload. The scripts contain JSON
            // only.
            let cmd: C = match serde_json::from_str(
                cap.get(3).unwrap().as_str())
            {
                Ok(c) => c,
                Err(e) => return Err(ScriptError::InvalidCmd(
                    exec_time_s, e
                ))
            };

            // Build command from the match
            cmd_queue.push_back(TimedCmd {
                exec_time_s,
                cmd
            });

            num_caps += 1;
        }

        if num_caps == 0 {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds: cmd_queue
        })
    }

    /// Return a vector of pending commands, or `None` if no commands need
    /// executing now.
    ///
    /// The current time is passed in rather than read from the wall clock so
    /// that scripts replay deterministically against the simulation clock.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds<C> {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.len() == 0 {
            return PendingCmds::EndOfScript
        }

        let mut cmd_vec: Vec<C> = vec![];

        // Peek items from the queue, if the head's exec time is lower than
        // the current time add it to the vector, and keep adding commands
        // until the exec times are larger than the current time.
        while
            self.cmds.len() > 0
            &&
            self.cmds.front().unwrap().exec_time_s < current_time_s
        {
            cmd_vec.push(self.cmds.pop_front().unwrap().cmd);
        }

        // If the vector is longer than 0 return Some, otherwise None
        if cmd_vec.len() > 0 {
            PendingCmds::Some(cmd_vec)
        }
        else {
            PendingCmds::None
        }
    }

    /// Get the number of commands in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    enum TestCmd {
        Go,
        Steer { demand: f64 }
    }

    #[test]
    fn test_script_parse_and_timing() {
        let script = "\
            0.5: \"Go\";\n\
            1.5: {\"Steer\": {\"demand\": -1.0}};\n";

        let script_path = std::env::temp_dir().join("si_test_script.sps");
        fs::write(&script_path, script).unwrap();

        let mut si: ScriptInterpreter<TestCmd> =
            ScriptInterpreter::new(&script_path).unwrap();

        assert_eq!(si.get_num_cmds(), 2);
        assert!((si.get_duration() - 1.5).abs() < 1e-9);

        // Nothing pending before the first timestamp
        match si.get_pending_cmds(0.1) {
            PendingCmds::None => (),
            _ => panic!("expected no pending commands at t=0.1")
        }

        // First command due
        match si.get_pending_cmds(0.6) {
            PendingCmds::Some(cmds) => assert_eq!(cmds, vec![TestCmd::Go]),
            _ => panic!("expected one pending command at t=0.6")
        }

        // Second command due
        match si.get_pending_cmds(2.0) {
            PendingCmds::Some(cmds) => {
                assert_eq!(cmds, vec![TestCmd::Steer { demand: -1.0 }])
            }
            _ => panic!("expected one pending command at t=2.0")
        }

        // Script exhausted
        match si.get_pending_cmds(3.0) {
            PendingCmds::EndOfScript => (),
            _ => panic!("expected end of script at t=3.0")
        }
    }

    #[test]
    fn test_empty_script_is_error() {
        let script_path = std::env::temp_dir().join("si_test_empty.sps");
        fs::write(&script_path, "# no commands here\n").unwrap();

        let result: Result<ScriptInterpreter<TestCmd>, _> =
            ScriptInterpreter::new(&script_path);

        assert!(matches!(result, Err(ScriptError::ScriptEmpty)));
    }
}
