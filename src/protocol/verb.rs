//! Verb descriptors
//!
//! Every protocol operation is described as data: its wire name, the rules
//! its arguments must satisfy, whether the request carries a body, and which
//! status words it treats as results, empty results or errors. [`Command`]
//! is generic over these descriptors.
//!
//! [`Command`]: super::Command

use crate::error::{Error, Result};
use super::Status;

/// Highest priority value the server accepts (lowest urgency)
pub const MAX_PRIORITY: u64 = u32::MAX as u64;

/// Longest tube name, in bytes
pub const MAX_TUBE_NAME_LEN: usize = 200;

/// Argument validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// Positive job id
    JobId,
    /// 0..=MAX_PRIORITY
    Priority,
    /// Non-negative number of seconds; carries the argument's name
    Seconds(&'static str),
    /// Positive time-to-run in seconds
    Ttr,
    /// Positive upper bound for `kick`
    Bound,
    /// Tube name
    Tube,
}

impl Arg {
    /// Validate a raw argument, returning its normalized wire form
    pub fn check(self, raw: &str) -> Result<String> {
        match self {
            Arg::JobId => match raw.trim().parse::<u64>() {
                Ok(id) if id > 0 => Ok(id.to_string()),
                _ => Err(Error::invalid("job id must be a positive integer")),
            },
            Arg::Priority => match raw.trim().parse::<u64>() {
                Ok(priority) if priority <= MAX_PRIORITY => Ok(priority.to_string()),
                _ => Err(Error::invalid(format!(
                    "priority must be between 0 and {}",
                    MAX_PRIORITY
                ))),
            },
            Arg::Seconds(label) => match raw.trim().parse::<u32>() {
                Ok(seconds) => Ok(seconds.to_string()),
                Err(_) => Err(Error::invalid(format!(
                    "{} must be a non-negative integer",
                    label
                ))),
            },
            Arg::Ttr => match raw.trim().parse::<u32>() {
                Ok(ttr) if ttr > 0 => Ok(ttr.to_string()),
                _ => Err(Error::invalid("ttr must be a positive integer")),
            },
            Arg::Bound => match raw.trim().parse::<u32>() {
                Ok(bound) if bound > 0 => Ok(bound.to_string()),
                _ => Err(Error::invalid("kick bound must be a positive integer")),
            },
            Arg::Tube => check_tube(raw),
        }
    }
}

fn check_tube(raw: &str) -> Result<String> {
    let tube = raw.trim();
    if tube.is_empty() {
        return Err(Error::invalid(
            "tube name must be a non-empty string after trimming whitespace",
        ));
    }
    if tube.len() > MAX_TUBE_NAME_LEN {
        return Err(Error::invalid(format!(
            "tube name must be at most {} bytes",
            MAX_TUBE_NAME_LEN
        )));
    }
    if tube.starts_with('-') {
        return Err(Error::invalid("tube name must not start with a hyphen"));
    }
    if let Some(bad) = tube
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || "-+/;.$_()".contains(*c)))
    {
        return Err(Error::invalid(format!(
            "tube name contains invalid character {:?}",
            bad
        )));
    }
    Ok(tube.to_string())
}

/// What a status word means for a given verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The status word itself is the result
    Word,
    /// One numeric parameter (job id, count)
    Number,
    /// One name parameter (tube)
    Name,
    /// Job id and byte count; a job body follows
    Job,
    /// Byte count; a YAML body follows
    Data,
    /// Normal "nothing there" answer
    Empty,
    /// The server refused the request as the client's fault
    Rejected,
    /// The server cannot take work right now
    Unavailable,
}

impl Outcome {
    /// Index of the status-line parameter holding the body length
    pub fn body_len_param(self) -> Option<usize> {
        match self {
            Outcome::Job => Some(1),
            Outcome::Data => Some(0),
            _ => None,
        }
    }
}

/// Static description of one verb
#[derive(Debug)]
pub struct VerbSpec {
    pub name: &'static str,
    pub args: &'static [Arg],
    /// The request is followed by a length-prefixed body
    pub has_body: bool,
    /// YAML bodies are sequences rather than mappings
    pub yaml_list: bool,
    pub replies: &'static [(Status, Outcome)],
}

/// Protocol verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Put,
    Use,
    Reserve,
    ReserveWithTimeout,
    ReserveJob,
    Delete,
    Release,
    Bury,
    Touch,
    Watch,
    Ignore,
    Peek,
    PeekReady,
    PeekDelayed,
    PeekBuried,
    Kick,
    KickJob,
    Stats,
    StatsJob,
    StatsTube,
    ListTubes,
    ListTubeUsed,
    ListTubesWatched,
    PauseTube,
}

const RESERVE_REPLIES: &[(Status, Outcome)] = &[
    (Status::Reserved, Outcome::Job),
    (Status::TimedOut, Outcome::Empty),
    (Status::DeadlineSoon, Outcome::Empty),
];

const PEEK_REPLIES: &[(Status, Outcome)] = &[
    (Status::Found, Outcome::Job),
    (Status::NotFound, Outcome::Empty),
];

const STATS_REPLIES: &[(Status, Outcome)] = &[
    (Status::Ok, Outcome::Data),
    (Status::NotFound, Outcome::Empty),
];

const PUT: VerbSpec = VerbSpec {
    name: "put",
    args: &[Arg::Priority, Arg::Seconds("delay"), Arg::Ttr],
    has_body: true,
    yaml_list: false,
    replies: &[
        (Status::Inserted, Outcome::Number),
        (Status::Buried, Outcome::Number),
        (Status::ExpectedCrlf, Outcome::Rejected),
        (Status::JobTooBig, Outcome::Rejected),
        (Status::Draining, Outcome::Unavailable),
    ],
};

const USE: VerbSpec = VerbSpec {
    name: "use",
    args: &[Arg::Tube],
    has_body: false,
    yaml_list: false,
    replies: &[(Status::Using, Outcome::Name)],
};

const RESERVE: VerbSpec = VerbSpec {
    name: "reserve",
    args: &[],
    has_body: false,
    yaml_list: false,
    replies: RESERVE_REPLIES,
};

const RESERVE_WITH_TIMEOUT: VerbSpec = VerbSpec {
    name: "reserve-with-timeout",
    args: &[Arg::Seconds("timeout")],
    has_body: false,
    yaml_list: false,
    replies: RESERVE_REPLIES,
};

const RESERVE_JOB: VerbSpec = VerbSpec {
    name: "reserve-job",
    args: &[Arg::JobId],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Reserved, Outcome::Job),
        (Status::NotFound, Outcome::Empty),
    ],
};

const DELETE: VerbSpec = VerbSpec {
    name: "delete",
    args: &[Arg::JobId],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Deleted, Outcome::Word),
        (Status::NotFound, Outcome::Empty),
    ],
};

const RELEASE: VerbSpec = VerbSpec {
    name: "release",
    args: &[Arg::JobId, Arg::Priority, Arg::Seconds("delay")],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Released, Outcome::Word),
        (Status::Buried, Outcome::Word),
        (Status::NotFound, Outcome::Empty),
    ],
};

const BURY: VerbSpec = VerbSpec {
    name: "bury",
    args: &[Arg::JobId, Arg::Priority],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Buried, Outcome::Word),
        (Status::NotFound, Outcome::Empty),
    ],
};

const TOUCH: VerbSpec = VerbSpec {
    name: "touch",
    args: &[Arg::JobId],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Touched, Outcome::Word),
        (Status::NotFound, Outcome::Empty),
    ],
};

const WATCH: VerbSpec = VerbSpec {
    name: "watch",
    args: &[Arg::Tube],
    has_body: false,
    yaml_list: false,
    replies: &[(Status::Watching, Outcome::Number)],
};

const IGNORE: VerbSpec = VerbSpec {
    name: "ignore",
    args: &[Arg::Tube],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Watching, Outcome::Number),
        (Status::NotIgnored, Outcome::Rejected),
    ],
};

const PEEK: VerbSpec = VerbSpec {
    name: "peek",
    args: &[Arg::JobId],
    has_body: false,
    yaml_list: false,
    replies: PEEK_REPLIES,
};

const PEEK_READY: VerbSpec = VerbSpec {
    name: "peek-ready",
    args: &[],
    has_body: false,
    yaml_list: false,
    replies: PEEK_REPLIES,
};

const PEEK_DELAYED: VerbSpec = VerbSpec {
    name: "peek-delayed",
    args: &[],
    has_body: false,
    yaml_list: false,
    replies: PEEK_REPLIES,
};

const PEEK_BURIED: VerbSpec = VerbSpec {
    name: "peek-buried",
    args: &[],
    has_body: false,
    yaml_list: false,
    replies: PEEK_REPLIES,
};

const KICK: VerbSpec = VerbSpec {
    name: "kick",
    args: &[Arg::Bound],
    has_body: false,
    yaml_list: false,
    replies: &[(Status::Kicked, Outcome::Number)],
};

const KICK_JOB: VerbSpec = VerbSpec {
    name: "kick-job",
    args: &[Arg::JobId],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Kicked, Outcome::Word),
        (Status::NotFound, Outcome::Empty),
    ],
};

const STATS: VerbSpec = VerbSpec {
    name: "stats",
    args: &[],
    has_body: false,
    yaml_list: false,
    replies: &[(Status::Ok, Outcome::Data)],
};

const STATS_JOB: VerbSpec = VerbSpec {
    name: "stats-job",
    args: &[Arg::JobId],
    has_body: false,
    yaml_list: false,
    replies: STATS_REPLIES,
};

const STATS_TUBE: VerbSpec = VerbSpec {
    name: "stats-tube",
    args: &[Arg::Tube],
    has_body: false,
    yaml_list: false,
    replies: STATS_REPLIES,
};

const LIST_TUBES: VerbSpec = VerbSpec {
    name: "list-tubes",
    args: &[],
    has_body: false,
    yaml_list: true,
    replies: &[(Status::Ok, Outcome::Data)],
};

const LIST_TUBE_USED: VerbSpec = VerbSpec {
    name: "list-tube-used",
    args: &[],
    has_body: false,
    yaml_list: false,
    replies: &[(Status::Using, Outcome::Name)],
};

const LIST_TUBES_WATCHED: VerbSpec = VerbSpec {
    name: "list-tubes-watched",
    args: &[],
    has_body: false,
    yaml_list: true,
    replies: &[(Status::Ok, Outcome::Data)],
};

const PAUSE_TUBE: VerbSpec = VerbSpec {
    name: "pause-tube",
    args: &[Arg::Tube, Arg::Seconds("delay")],
    has_body: false,
    yaml_list: false,
    replies: &[
        (Status::Paused, Outcome::Word),
        (Status::NotFound, Outcome::Empty),
    ],
};

impl Verb {
    pub const ALL: [Verb; 24] = [
        Verb::Put,
        Verb::Use,
        Verb::Reserve,
        Verb::ReserveWithTimeout,
        Verb::ReserveJob,
        Verb::Delete,
        Verb::Release,
        Verb::Bury,
        Verb::Touch,
        Verb::Watch,
        Verb::Ignore,
        Verb::Peek,
        Verb::PeekReady,
        Verb::PeekDelayed,
        Verb::PeekBuried,
        Verb::Kick,
        Verb::KickJob,
        Verb::Stats,
        Verb::StatsJob,
        Verb::StatsTube,
        Verb::ListTubes,
        Verb::ListTubeUsed,
        Verb::ListTubesWatched,
        Verb::PauseTube,
    ];

    /// The descriptor for this verb
    pub fn spec(self) -> &'static VerbSpec {
        match self {
            Verb::Put => &PUT,
            Verb::Use => &USE,
            Verb::Reserve => &RESERVE,
            Verb::ReserveWithTimeout => &RESERVE_WITH_TIMEOUT,
            Verb::ReserveJob => &RESERVE_JOB,
            Verb::Delete => &DELETE,
            Verb::Release => &RELEASE,
            Verb::Bury => &BURY,
            Verb::Touch => &TOUCH,
            Verb::Watch => &WATCH,
            Verb::Ignore => &IGNORE,
            Verb::Peek => &PEEK,
            Verb::PeekReady => &PEEK_READY,
            Verb::PeekDelayed => &PEEK_DELAYED,
            Verb::PeekBuried => &PEEK_BURIED,
            Verb::Kick => &KICK,
            Verb::KickJob => &KICK_JOB,
            Verb::Stats => &STATS,
            Verb::StatsJob => &STATS_JOB,
            Verb::StatsTube => &STATS_TUBE,
            Verb::ListTubes => &LIST_TUBES,
            Verb::ListTubeUsed => &LIST_TUBE_USED,
            Verb::ListTubesWatched => &LIST_TUBES_WATCHED,
            Verb::PauseTube => &PAUSE_TUBE,
        }
    }

    /// Wire name
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look a verb up by its wire name
    pub fn from_name(name: &str) -> Option<Verb> {
        Verb::ALL.iter().copied().find(|verb| verb.name() == name)
    }

    /// Classify a status word for this verb
    ///
    /// Returns `None` for words the verb never expects.
    pub fn outcome(self, status: Status) -> Option<Outcome> {
        let declared = self
            .spec()
            .replies
            .iter()
            .find(|(word, _)| *word == status)
            .map(|(_, outcome)| *outcome);

        declared.or(match status {
            Status::OutOfMemory | Status::InternalError => Some(Outcome::Unavailable),
            Status::BadFormat | Status::UnknownCommand => Some(Outcome::Rejected),
            _ => None,
        })
    }
}
