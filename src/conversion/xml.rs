//! TCX rendering. Everything here is a thin boundary over the assembled
//! tree: element order, attribute placement, and the namespace constants are
//! a compatibility contract with consumers of the format.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::conversion::types::{
    Activity, Author, ConvertError, Creator, Lap, Trackpoint, TrainingCenterDatabase,
};
use crate::conversion::units::format_number;

pub const TCD_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
pub const XML_SCHEMA_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const ACTIVITY_EXTENSION_NAMESPACE: &str =
    "http://www.garmin.com/xmlschemas/ActivityExtension/v2";
pub const SCHEMA_LOCATION: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2 \
     http://www.garmin.com/xmlschemas/ActivityExtensionv2.xsd \
     http://www.garmin.com/xmlschemas/FatCalories/v1 \
     http://www.garmin.com/xmlschemas/fatcalorieextensionv1.xsd \
     http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2 \
     http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd";

type XmlWriter = Writer<Vec<u8>>;

/// Render the assembled document: XML declaration, two-space indentation,
/// trailing newline.
pub fn serialize_document(document: &TrainingCenterDatabase) -> Result<String, ConvertError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(serialize_err)?;

    let mut root = BytesStart::new("TrainingCenterDatabase");
    root.push_attribute(("xmlns", TCD_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XML_SCHEMA_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer
        .write_event(Event::Start(root))
        .map_err(serialize_err)?;

    start(&mut writer, "Activities")?;
    write_activity(&mut writer, &document.activity)?;
    end(&mut writer, "Activities")?;

    write_author(&mut writer, &document.author)?;

    writer
        .write_event(Event::End(BytesEnd::new("TrainingCenterDatabase")))
        .map_err(serialize_err)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|err| ConvertError::Serialize(err.to_string()))
}

fn write_activity(writer: &mut XmlWriter, activity: &Activity) -> Result<(), ConvertError> {
    let mut elem = BytesStart::new("Activity");
    elem.push_attribute(("Sport", activity.sport));
    writer
        .write_event(Event::Start(elem))
        .map_err(serialize_err)?;

    text_element(writer, "Id", &activity.id.to_tcx())?;
    for lap in &activity.laps {
        write_lap(writer, lap)?;
    }
    if let Some(creator) = &activity.creator {
        write_creator(writer, creator)?;
    }

    end(writer, "Activity")
}

fn write_lap(writer: &mut XmlWriter, lap: &Lap) -> Result<(), ConvertError> {
    let mut elem = BytesStart::new("Lap");
    elem.push_attribute(("StartTime", lap.start_time.to_tcx().as_str()));
    writer
        .write_event(Event::Start(elem))
        .map_err(serialize_err)?;

    optional_number(writer, "TotalTimeSeconds", lap.total_time_seconds)?;
    optional_number(writer, "DistanceMeters", lap.distance_meters)?;
    optional_number(writer, "MaximumSpeed", lap.maximum_speed)?;
    optional_number(writer, "Calories", lap.calories)?;
    if let Some(intensity) = lap.intensity {
        text_element(writer, "Intensity", intensity)?;
    }
    optional_number(writer, "Cadence", lap.cadence)?;
    text_element(writer, "TriggerMethod", lap.trigger_method)?;

    start(writer, "Track")?;
    for trackpoint in &lap.track {
        write_trackpoint(writer, trackpoint)?;
    }
    end(writer, "Track")?;

    end(writer, "Lap")
}

fn write_trackpoint(writer: &mut XmlWriter, trackpoint: &Trackpoint) -> Result<(), ConvertError> {
    start(writer, "Trackpoint")?;
    text_element(writer, "Time", &trackpoint.time.to_tcx())?;

    if let Some(position) = &trackpoint.position {
        start(writer, "Position")?;
        number_element(writer, "LatitudeDegrees", position.latitude_degrees)?;
        number_element(writer, "LongitudeDegrees", position.longitude_degrees)?;
        end(writer, "Position")?;
    }

    optional_number(writer, "AltitudeMeters", trackpoint.altitude_meters)?;
    optional_number(writer, "DistanceMeters", trackpoint.distance_meters)?;

    if let Some(heart_rate) = trackpoint.heart_rate_bpm {
        let mut elem = BytesStart::new("HeartRateBpm");
        elem.push_attribute(("xsi:type", "HeartRateInBeatsPerMinute_t"));
        writer
            .write_event(Event::Start(elem))
            .map_err(serialize_err)?;
        number_element(writer, "Value", heart_rate)?;
        end(writer, "HeartRateBpm")?;
    }

    optional_number(writer, "Cadence", trackpoint.cadence)?;

    if let Some(speed) = trackpoint.speed {
        start(writer, "Extensions")?;
        let mut tpx = BytesStart::new("TPX");
        tpx.push_attribute(("xmlns", ACTIVITY_EXTENSION_NAMESPACE));
        tpx.push_attribute(("CadenceSensor", "Footpod"));
        writer
            .write_event(Event::Start(tpx))
            .map_err(serialize_err)?;
        number_element(writer, "Speed", speed)?;
        end(writer, "TPX")?;
        end(writer, "Extensions")?;
    }

    end(writer, "Trackpoint")
}

fn write_creator(writer: &mut XmlWriter, creator: &Creator) -> Result<(), ConvertError> {
    let mut elem = BytesStart::new("Creator");
    elem.push_attribute(("xsi:type", "Device_t"));
    writer
        .write_event(Event::Start(elem))
        .map_err(serialize_err)?;

    if let Some(name) = &creator.name {
        text_element(writer, "Name", name)?;
    }
    if let Some(unit_id) = creator.unit_id {
        text_element(writer, "UnitID", &unit_id.to_string())?;
    }
    if let Some(product_id) = creator.product_id {
        text_element(writer, "ProductID", &product_id.to_string())?;
    }

    start(writer, "Version")?;
    text_element(writer, "VersionMajor", &creator.version_major)?;
    text_element(writer, "VersionMinor", &creator.version_minor)?;
    text_element(writer, "BuildMajor", "0")?;
    text_element(writer, "BuildMinor", "0")?;
    end(writer, "Version")?;

    end(writer, "Creator")
}

fn write_author(writer: &mut XmlWriter, author: &Author) -> Result<(), ConvertError> {
    let mut elem = BytesStart::new("Author");
    elem.push_attribute(("xsi:type", "Application_t"));
    writer
        .write_event(Event::Start(elem))
        .map_err(serialize_err)?;

    text_element(writer, "Name", author.name)?;
    text_element(writer, "LangID", author.lang_id)?;

    start(writer, "Version")?;
    start(writer, "Build")?;
    text_element(writer, "VersionMajor", author.version_major)?;
    text_element(writer, "VersionMinor", author.version_minor)?;
    text_element(writer, "BuildMajor", "0")?;
    text_element(writer, "BuildMinor", "0")?;
    end(writer, "Build")?;
    end(writer, "Version")?;

    end(writer, "Author")
}

fn start(writer: &mut XmlWriter, name: &str) -> Result<(), ConvertError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(serialize_err)
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), ConvertError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(serialize_err)
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), ConvertError> {
    start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(serialize_err)?;
    end(writer, name)
}

fn number_element(writer: &mut XmlWriter, name: &str, value: f64) -> Result<(), ConvertError> {
    text_element(writer, name, &format_number(value))
}

fn optional_number(
    writer: &mut XmlWriter,
    name: &str,
    value: Option<f64>,
) -> Result<(), ConvertError> {
    match value {
        Some(value) => number_element(writer, name, value),
        None => Ok(()),
    }
}

fn serialize_err<E: std::fmt::Display>(err: E) -> ConvertError {
    ConvertError::Serialize(err.to_string())
}
