use chrono::{DateTime, NaiveDateTime, Utc};
use fitparser::profile::MesgNum;

use crate::conversion::stream::{MessageStream, TimeValue};
use crate::conversion::types::ConvertError;

/// An instant ready for output: the wall-clock time plus whether it is
/// confirmed UTC. Only confirmed-UTC instants render the trailing "Z".
///
/// Ordering and equality compare the instant alone; the zone flag never
/// affects windowing decisions.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTime {
    instant: NaiveDateTime,
    utc: bool,
}

impl ResolvedTime {
    pub fn instant(&self) -> NaiveDateTime {
        self.instant
    }

    pub fn is_utc(&self) -> bool {
        self.utc
    }

    /// Extended ISO-8601, seconds precision, "Z" suffix only when confirmed
    /// UTC.
    pub fn to_tcx(&self) -> String {
        let base = self.instant.format("%Y-%m-%dT%H:%M:%S");
        if self.utc {
            format!("{base}Z")
        } else {
            base.to_string()
        }
    }
}

impl PartialEq for ResolvedTime {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl PartialOrd for ResolvedTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.instant.partial_cmp(&other.instant)
    }
}

/// Offset applied to bare counter timestamps, derived once per conversion.
/// Every counter in the same file must resolve through the same offset.
#[derive(Debug, Clone, Copy)]
pub struct EpochContext {
    offset: i64,
    utc: bool,
}

impl EpochContext {
    /// Derive the offset from the "activity" anchor message: one that carries
    /// both a zone-naive local timestamp and the bare counter for the same
    /// instant. Returns `None` when no such anchor exists; the error is
    /// raised later, only if a counter actually needs resolving.
    pub fn derive(stream: &MessageStream) -> Option<Self> {
        for activity in stream.of_kind(MesgNum::Activity) {
            let local = match activity.time("local_timestamp") {
                Some(TimeValue::Absolute(instant)) => instant,
                _ => continue,
            };
            let counter = match activity.time("timestamp") {
                Some(TimeValue::Counter(counter)) => counter,
                _ => continue,
            };
            // Wall-clock seconds of the local reading, zone discarded: the
            // derived instants are expressed in unknown local time.
            let local_seconds = local.naive_local().and_utc().timestamp();
            return Some(Self {
                offset: local_seconds - counter,
                utc: false,
            });
        }
        None
    }

    #[cfg(test)]
    pub fn with_offset(offset: i64) -> Self {
        Self { offset, utc: false }
    }
}

/// Resolve a raw timestamp value into an absolute instant.
///
/// `None` input means "field not present" and stays `None`; callers decide
/// whether absence is an omission or a structural defect. A bare counter
/// without an [`EpochContext`] is fatal: every timestamp in the document
/// depends on a consistent resolution.
pub fn resolve(
    value: Option<TimeValue>,
    epoch: Option<&EpochContext>,
) -> Result<Option<ResolvedTime>, ConvertError> {
    match value {
        None => Ok(None),
        Some(TimeValue::Absolute(instant)) => Ok(Some(ResolvedTime {
            instant: instant.with_timezone(&Utc).naive_utc(),
            utc: true,
        })),
        Some(TimeValue::Counter(counter)) => {
            let epoch = epoch.ok_or_else(|| {
                ConvertError::MissingTimeInformation(
                    "relative timestamp without an activity anchor to derive an epoch from".into(),
                )
            })?;
            let seconds = counter + epoch.offset;
            let instant = DateTime::<Utc>::from_timestamp(seconds, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| {
                    ConvertError::MissingTimeInformation(format!(
                        "relative timestamp {counter} resolves outside the representable range"
                    ))
                })?;
            Ok(Some(ResolvedTime {
                instant,
                utc: epoch.utc,
            }))
        }
    }
}
