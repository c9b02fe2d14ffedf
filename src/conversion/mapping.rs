//! FIT vocabulary to TCX vocabulary tables.
//!
//! Sport and trigger method are mandatory in the output schema, so those
//! tables are total with a documented fallback. Intensity is an optional
//! element, so an unknown or absent intensity is omitted rather than guessed.

pub fn sport(value: Option<&str>) -> &'static str {
    match value {
        Some("running") => "Running",
        Some("cycling") => "Biking",
        _ => "Other",
    }
}

pub fn lap_trigger(value: Option<&str>) -> &'static str {
    match value {
        Some("manual") => "Manual",
        Some("time") => "Time",
        Some("distance") => "Distance",
        Some("position_start") | Some("position_lap") | Some("position_waypoint")
        | Some("position_marked") => "Location",
        Some("session_end") | Some("fitness_equipment") => "Manual",
        _ => "Manual",
    }
}

pub fn intensity(value: Option<&str>) -> Option<&'static str> {
    match value? {
        "active" | "warmup" | "cooldown" => Some("Active"),
        "rest" => Some("Resting"),
        _ => None,
    }
}
