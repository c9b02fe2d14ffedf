use chrono::{DateTime, Local, TimeZone, Utc};
use fit2tcx::conversion::{
    ConvertError, FieldValue, Message, MessageStream, assemble_document, convert_stream,
};
use fitparser::profile::MesgNum;

/// A fixed UTC instant converted into the parser's local representation, so
/// assertions on rendered times hold on any machine timezone.
fn utc_instant(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
    Utc.with_ymd_and_hms(2012, 6, 15, hour, minute, second)
        .unwrap()
        .with_timezone(&Local)
}

fn timestamp(hour: u32, minute: u32, second: u32) -> FieldValue {
    FieldValue::Timestamp(utc_instant(hour, minute, second))
}

fn session(start: FieldValue, sport: &str) -> Message {
    Message::new(
        MesgNum::Session,
        vec![
            ("start_time".into(), start),
            ("sport".into(), FieldValue::Text(sport.into())),
        ],
    )
}

fn lap(start: FieldValue, end: Option<FieldValue>) -> Message {
    let mut fields = vec![("start_time".into(), start)];
    if let Some(end) = end {
        fields.push(("timestamp".into(), end));
    }
    Message::new(MesgNum::Lap, fields)
}

fn record(time: FieldValue) -> Message {
    Message::new(MesgNum::Record, vec![("timestamp".into(), time)])
}

fn record_with(time: FieldValue, extra: Vec<(&str, FieldValue)>) -> Message {
    let mut fields = vec![("timestamp".into(), time)];
    fields.extend(
        extra
            .into_iter()
            .map(|(name, value)| (name.to_string(), value)),
    );
    Message::new(MesgNum::Record, fields)
}

#[test]
fn windowing_selects_records_inside_lap_bounds() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 0, 0), Some(timestamp(10, 10, 0))),
        record(timestamp(9, 59, 59)),
        record(timestamp(10, 0, 0)),
        record(timestamp(10, 5, 0)),
        record(timestamp(10, 10, 0)),
        record(timestamp(10, 10, 1)),
    ]);

    let document = assemble_document(&stream).expect("assembly should succeed");
    let track = &document.activity.laps[0].track;

    let times: Vec<String> = track.iter().map(|tp| tp.time.to_tcx()).collect();
    assert_eq!(
        times,
        vec![
            "2012-06-15T10:00:00Z",
            "2012-06-15T10:05:00Z",
            "2012-06-15T10:10:00Z",
        ]
    );
}

#[test]
fn boundary_record_lands_in_both_adjacent_laps() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 0, 0), Some(timestamp(10, 5, 0))),
        lap(timestamp(10, 5, 0), Some(timestamp(10, 10, 0))),
        record(timestamp(10, 5, 0)),
    ]);

    let document = assemble_document(&stream).expect("assembly should succeed");
    assert_eq!(document.activity.laps[0].track.len(), 1);
    assert_eq!(document.activity.laps[1].track.len(), 1);
}

#[test]
fn open_lap_extends_to_end_of_data() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 0, 0), None),
        record(timestamp(9, 0, 0)),
        record(timestamp(10, 30, 0)),
        record(timestamp(23, 59, 59)),
    ]);

    let document = assemble_document(&stream).expect("assembly should succeed");
    let track = &document.activity.laps[0].track;
    assert_eq!(track.len(), 2);
    assert_eq!(track[0].time.to_tcx(), "2012-06-15T10:30:00Z");
}

#[test]
fn missing_session_is_fatal() {
    let stream = MessageStream::new(vec![
        lap(timestamp(10, 0, 0), None),
        record(timestamp(10, 1, 0)),
    ]);

    let result = convert_stream(&stream);
    assert!(matches!(result, Err(ConvertError::NoSessionData)));
}

#[test]
fn lap_without_start_time_is_fatal() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        Message::new(MesgNum::Lap, vec![]),
    ]);

    let result = assemble_document(&stream);
    assert!(matches!(
        result,
        Err(ConvertError::MissingTimeInformation(_))
    ));
}

#[test]
fn record_without_timestamp_is_fatal() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 0, 0), None),
        Message::new(MesgNum::Record, vec![]),
    ]);

    let result = assemble_document(&stream);
    assert!(matches!(
        result,
        Err(ConvertError::MissingTimeInformation(_))
    ));
}

#[test]
fn relative_timestamps_without_anchor_are_fatal() {
    let stream = MessageStream::new(vec![session(FieldValue::Integer(1000), "running")]);

    let result = assemble_document(&stream);
    assert!(matches!(
        result,
        Err(ConvertError::MissingTimeInformation(_))
    ));
}

#[test]
fn epoch_offset_derives_from_the_activity_anchor() {
    // Every timestamp is a bare counter; the activity message carries the
    // matching counter plus the local wall-clock reading of that instant.
    let anchor = Message::new(
        MesgNum::Activity,
        vec![
            ("timestamp".into(), FieldValue::Integer(1000)),
            (
                "local_timestamp".into(),
                FieldValue::Timestamp(Local.with_ymd_and_hms(2012, 6, 15, 10, 30, 0).unwrap()),
            ),
        ],
    );
    let stream = MessageStream::new(vec![
        session(FieldValue::Integer(1000), "running"),
        anchor,
        lap(FieldValue::Integer(1000), Some(FieldValue::Integer(1060))),
        record(FieldValue::Integer(1030)),
    ]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    let activity = &converted.document.activity;

    // Derived instants are local wall-clock time and carry no UTC marker.
    assert_eq!(activity.id.to_tcx(), "2012-06-15T10:30:00");
    assert_eq!(
        activity.laps[0].track[0].time.to_tcx(),
        "2012-06-15T10:30:30"
    );
    assert!(converted.xml.contains("<Id>2012-06-15T10:30:00</Id>"));
    assert!(!converted.xml.contains("2012-06-15T10:30:00Z"));
}

#[test]
fn absolute_timestamps_render_with_utc_marker() {
    let stream = MessageStream::new(vec![session(timestamp(10, 30, 0), "cycling")]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    assert!(
        converted
            .xml
            .contains("<Id>2012-06-15T10:30:00Z</Id>")
    );
    assert!(converted.xml.contains("<Activity Sport=\"Biking\">"));
}

#[test]
fn unknown_sport_maps_to_other() {
    let stream = MessageStream::new(vec![session(timestamp(10, 0, 0), "kayaking")]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    assert!(converted.xml.contains("<Activity Sport=\"Other\">"));
}

#[test]
fn unknown_intensity_is_omitted_and_trigger_falls_back() {
    let lap_message = Message::new(
        MesgNum::Lap,
        vec![
            ("start_time".into(), timestamp(10, 0, 0)),
            ("timestamp".into(), timestamp(10, 5, 0)),
            ("intensity".into(), FieldValue::Text("sleeping".into())),
            (
                "lap_trigger".into(),
                FieldValue::Text("fitness_equipment".into()),
            ),
        ],
    );
    let stream = MessageStream::new(vec![session(timestamp(10, 0, 0), "running"), lap_message]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    assert!(!converted.xml.contains("<Intensity>"));
    assert!(
        converted
            .xml
            .contains("<TriggerMethod>Manual</TriggerMethod>")
    );
}

#[test]
fn absent_lap_fields_are_omitted_entirely() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        Message::new(
            MesgNum::Lap,
            vec![
                ("start_time".into(), timestamp(10, 0, 0)),
                ("timestamp".into(), timestamp(10, 5, 0)),
                ("total_distance".into(), FieldValue::Float(1250.5)),
            ],
        ),
    ]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    assert!(
        converted
            .xml
            .contains("<DistanceMeters>1250.5</DistanceMeters>")
    );
    assert!(!converted.xml.contains("<TotalTimeSeconds>"));
    assert!(!converted.xml.contains("<Calories>"));
    assert!(!converted.xml.contains("<MaximumSpeed>"));
}

#[test]
fn trackpoint_with_lone_latitude_emits_no_position() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 0, 0), None),
        record_with(
            timestamp(10, 1, 0),
            vec![("position_lat", FieldValue::Integer(536_870_912))],
        ),
    ]);

    let document = assemble_document(&stream).expect("assembly should succeed");
    assert!(document.activity.laps[0].track[0].position.is_none());

    let converted = convert_stream(&stream).expect("conversion should succeed");
    assert!(!converted.xml.contains("<Position>"));
}

#[test]
fn trackpoint_fields_render_converted_and_trimmed() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 0, 0), None),
        record_with(
            timestamp(10, 1, 0),
            vec![
                ("position_lat", FieldValue::Integer(536_870_912)),
                ("position_long", FieldValue::Integer(-1_073_741_824)),
                ("altitude", FieldValue::Float(12.25)),
                ("distance", FieldValue::Float(1000.0)),
                ("heart_rate", FieldValue::Integer(150)),
                ("cadence", FieldValue::Integer(85)),
                ("speed", FieldValue::Float(2.5)),
            ],
        ),
    ]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    let xml = &converted.xml;

    assert!(xml.contains("<LatitudeDegrees>45</LatitudeDegrees>"));
    assert!(xml.contains("<LongitudeDegrees>-90</LongitudeDegrees>"));
    assert!(xml.contains("<AltitudeMeters>12.25</AltitudeMeters>"));
    assert!(xml.contains("<DistanceMeters>1000</DistanceMeters>"));
    assert!(xml.contains("<Value>150</Value>"));
    assert!(xml.contains("<Cadence>85</Cadence>"));
    assert!(xml.contains("<Speed>2.5</Speed>"));
    assert!(xml.contains("CadenceSensor=\"Footpod\""));
}

#[test]
fn creator_prefers_product_name_and_splits_version() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        Message::new(
            MesgNum::DeviceInfo,
            vec![
                ("product_name".into(), FieldValue::Text("Forerunner 235".into())),
                ("serial_number".into(), FieldValue::Integer(3_900_001_234)),
                ("product".into(), FieldValue::Integer(2431)),
                ("software_version".into(), FieldValue::Float(3.1)),
            ],
        ),
    ]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    let xml = &converted.xml;

    assert!(xml.contains("<Name>Forerunner 235</Name>"));
    assert!(xml.contains("<UnitID>3900001234</UnitID>"));
    assert!(xml.contains("<ProductID>2431</ProductID>"));
    assert!(xml.contains("<VersionMajor>3</VersionMajor>"));
    assert!(xml.contains("<VersionMinor>10</VersionMinor>"));
}

#[test]
fn creator_name_combines_manufacturer_and_product() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        Message::new(
            MesgNum::DeviceInfo,
            vec![
                ("manufacturer".into(), FieldValue::Text("garmin".into())),
                ("product".into(), FieldValue::Text("edge500".into())),
            ],
        ),
    ]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    assert!(converted.xml.contains("<Name>garmin edge500</Name>"));
    // No software version reported: Garmin Connect still expects two minor
    // digits.
    assert!(converted.xml.contains("<VersionMajor>0</VersionMajor>"));
    assert!(converted.xml.contains("<VersionMinor>00</VersionMinor>"));
}

#[test]
fn missing_device_info_omits_creator() {
    let stream = MessageStream::new(vec![session(timestamp(10, 0, 0), "running")]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    assert!(converted.document.activity.creator.is_none());
    assert!(!converted.xml.contains("<Creator"));
}

#[test]
fn author_block_is_always_present() {
    let stream = MessageStream::new(vec![session(timestamp(10, 0, 0), "running")]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    let xml = &converted.xml;

    assert!(xml.contains("<Author xsi:type=\"Application_t\">"));
    assert!(xml.contains("<Name>Fit2Tcx</Name>"));
    assert!(xml.contains("<LangID>en</LangID>"));
}

#[test]
fn conversion_is_deterministic() {
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 0, 0), Some(timestamp(10, 5, 0))),
        record_with(
            timestamp(10, 1, 0),
            vec![("distance", FieldValue::Float(120.0))],
        ),
        record_with(
            timestamp(10, 2, 0),
            vec![("distance", FieldValue::Float(240.0))],
        ),
    ]);

    let first = convert_stream(&stream).expect("conversion should succeed");
    let second = convert_stream(&stream).expect("conversion should succeed");
    assert_eq!(first.xml, second.xml);
}

#[test]
fn lap_and_trackpoint_order_follows_the_stream() {
    // Laps arrive latest-first; the output must not re-sort them.
    let stream = MessageStream::new(vec![
        session(timestamp(10, 0, 0), "running"),
        lap(timestamp(10, 5, 0), Some(timestamp(10, 10, 0))),
        lap(timestamp(10, 0, 0), Some(timestamp(10, 5, 0))),
    ]);

    let document = assemble_document(&stream).expect("assembly should succeed");
    assert_eq!(
        document.activity.laps[0].start_time.to_tcx(),
        "2012-06-15T10:05:00Z"
    );
    assert_eq!(
        document.activity.laps[1].start_time.to_tcx(),
        "2012-06-15T10:00:00Z"
    );
}

#[test]
fn document_frame_carries_schema_constants() {
    let stream = MessageStream::new(vec![session(timestamp(10, 0, 0), "running")]);

    let converted = convert_stream(&stream).expect("conversion should succeed");
    let xml = &converted.xml;

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(
        "xmlns=\"http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2\""
    ));
    assert!(xml.contains("xsi:schemaLocation"));
    assert!(xml.ends_with("</TrainingCenterDatabase>\n"));
}
