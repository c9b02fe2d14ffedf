use fitparser::profile::MesgNum;

use crate::conversion::mapping;
use crate::conversion::stream::{Message, MessageStream};
use crate::conversion::time::{self, EpochContext, ResolvedTime};
use crate::conversion::types::{
    Activity, Author, ConvertError, Creator, Lap, Position, Trackpoint, TrainingCenterDatabase,
};
use crate::conversion::units::semicircles_to_degrees;

/// Build the full output tree from a buffered message stream.
///
/// The walk is session → laps → windowed trackpoints → creator → author.
/// Field absence is normal and yields omission; the only fatal conditions are
/// a missing session, an unresolvable timestamp, and a missing lap-start or
/// record timestamp.
pub fn assemble_document(stream: &MessageStream) -> Result<TrainingCenterDatabase, ConvertError> {
    let session = stream
        .first(MesgNum::Session)
        .ok_or(ConvertError::NoSessionData)?;

    // Derived at most once; every relative timestamp in this conversion
    // resolves through the same offset.
    let epoch = EpochContext::derive(stream);
    let epoch = epoch.as_ref();

    let id = time::resolve(session.time("start_time"), epoch)?
        .ok_or_else(|| missing("session start_time"))?;
    let sport = mapping::sport(session.text("sport"));

    let records: Vec<&Message> = stream.of_kind(MesgNum::Record).collect();

    let mut laps = Vec::new();
    for lap in stream.of_kind(MesgNum::Lap) {
        laps.push(assemble_lap(lap, &records, epoch)?);
    }

    let creator = stream.first(MesgNum::DeviceInfo).map(assemble_creator);

    Ok(TrainingCenterDatabase {
        activity: Activity {
            sport,
            id,
            laps,
            creator,
        },
        author: Author::fixed(),
    })
}

/// One lap: its stat fields, and every record whose resolved time falls into
/// `[start, end]` (or `[start, ..)` for an open lap), in stream order. The
/// bounds are inclusive on both ends; a record sitting exactly on a shared
/// lap boundary belongs to both laps.
fn assemble_lap(
    lap: &Message,
    records: &[&Message],
    epoch: Option<&EpochContext>,
) -> Result<Lap, ConvertError> {
    let start_time = time::resolve(lap.time("start_time"), epoch)?
        .ok_or_else(|| missing("lap start_time"))?;
    let end_time = time::resolve(lap.time("timestamp"), epoch)?;

    let mut track = Vec::new();
    for &record in records {
        let instant = time::resolve(record.time("timestamp"), epoch)?
            .ok_or_else(|| missing("record timestamp"))?;
        let in_window = start_time <= instant && end_time.map_or(true, |end| instant <= end);
        if in_window {
            track.push(assemble_trackpoint(record, instant));
        }
    }

    Ok(Lap {
        start_time,
        total_time_seconds: lap.float("total_elapsed_time"),
        distance_meters: lap.float("total_distance"),
        maximum_speed: lap.float("max_speed"),
        calories: lap.float("total_calories"),
        intensity: mapping::intensity(lap.text("intensity")),
        cadence: lap.float("avg_cadence"),
        trigger_method: mapping::lap_trigger(lap.text("lap_trigger")),
        track,
    })
}

fn assemble_trackpoint(record: &Message, time: ResolvedTime) -> Trackpoint {
    // A position is rendered only when both halves are present; a lone
    // latitude or longitude is meaningless in the output schema.
    let position = match (
        record.integer("position_lat"),
        record.integer("position_long"),
    ) {
        (Some(latitude), Some(longitude)) => Some(Position {
            latitude_degrees: semicircles_to_degrees(latitude),
            longitude_degrees: semicircles_to_degrees(longitude),
        }),
        _ => None,
    };

    Trackpoint {
        time,
        position,
        altitude_meters: record.float("altitude"),
        distance_meters: record.float("distance"),
        heart_rate_bpm: record.float("heart_rate"),
        cadence: record.float("cadence"),
        speed: record.float("speed"),
    }
}

fn assemble_creator(device_info: &Message) -> Creator {
    let name = device_info
        .text("product_name")
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(
            || match (device_info.text("manufacturer"), device_info.text("product")) {
                (Some(manufacturer), Some(product)) => Some(format!("{manufacturer} {product}")),
                (None, Some(product)) => Some(product.to_string()),
                (Some(manufacturer), None) => Some(manufacturer.to_string()),
                (None, None) => None,
            },
        );

    // Garmin Connect always writes two digits into VersionMinor.
    let software = format!(
        "{:.2}",
        device_info.float("software_version").unwrap_or(0.0)
    );
    let (version_major, version_minor) = match software.split_once('.') {
        Some((major, minor)) => (major.to_string(), minor.to_string()),
        None => (software, "00".to_string()),
    };

    Creator {
        name,
        unit_id: device_info.integer("serial_number"),
        product_id: device_info.integer("product"),
        version_major,
        version_minor,
    }
}

fn missing(what: &str) -> ConvertError {
    ConvertError::MissingTimeInformation(format!("{what} is required but absent"))
}
