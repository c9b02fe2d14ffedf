use crate::conversion::{ConvertedTcx, Lap};

fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(total) => {
            let rounded = total.round().max(0.0) as u64;
            let hours = rounded / 3600;
            let minutes = (rounded % 3600) / 60;
            let seconds = rounded % 60;

            if hours > 0 {
                format!("{}h {:02}m {:02}s", hours, minutes, seconds)
            } else {
                format!("{}m {:02}s", minutes, seconds)
            }
        }
        None => "—".to_string(),
    }
}

fn format_distance(meters: Option<f64>) -> String {
    match meters {
        Some(distance) if distance >= 1000.0 => format!("{:.2} km", distance / 1000.0),
        Some(distance) => format!("{:.0} m", distance),
        None => "—".to_string(),
    }
}

/// Sum an optional per-lap statistic; `None` when no lap carried it.
fn lap_total(laps: &[Lap], stat: impl Fn(&Lap) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = laps.iter().filter_map(&stat).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

pub fn render_landing_page() -> String {
    include_str!("../templates/landing.html").to_string()
}

pub fn render_conversion_result(converted: &ConvertedTcx, download_url: &str) -> String {
    let activity = &converted.document.activity;
    let trackpoint_count: usize = activity.laps.iter().map(|lap| lap.track.len()).sum();
    let total_time = lap_total(&activity.laps, |lap| lap.total_time_seconds);
    let total_distance = lap_total(&activity.laps, |lap| lap.distance_meters);

    let mut body = String::new();

    body.push_str("<section class=\"results-card\">");
    body.push_str(
        "<div class=\"results-header\"><div><p class=\"eyebrow\">Conversion Result</p><h2>Your TCX file is ready</h2></div>",
    );
    body.push_str(&format!(
        "<a class=\"cta\" download=\"activity.tcx\" href={download_url}>Download TCX</a>"
    ));
    body.push_str("</div>");

    body.push_str("<div class=\"summary-grid\">");
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Sport</p><p class=\"value\">{}</p></div>",
        activity.sport
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Activity Start</p><p class=\"value\">{}</p></div>",
        activity.id.to_tcx()
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Duration</p><p class=\"value\">{}</p></div>",
        format_duration(total_time)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Distance</p><p class=\"value\">{}</p></div>",
        format_distance(total_distance)
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Laps</p><p class=\"value\">{}</p></div>",
        activity.laps.len()
    ));
    body.push_str(&format!(
        "<div class=\"summary-card\"><p class=\"label\">Trackpoints</p><p class=\"value\">{}</p></div>",
        trackpoint_count
    ));
    body.push_str("</div>");
    body.push_str("</section>");

    body.push_str("<section class=\"results-card\">");
    body.push_str(
        "<div class=\"results-header\"><div><p class=\"eyebrow\">Laps</p><h2>Lap breakdown</h2></div></div>",
    );
    body.push_str(
        "<div class=\"table-wrapper\"><table><thead><tr><th>#</th><th>Start</th><th>Duration</th><th>Distance</th><th>Trigger</th><th>Trackpoints</th></tr></thead><tbody>",
    );

    for (index, lap) in activity.laps.iter().enumerate() {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            index + 1,
            lap.start_time.to_tcx(),
            format_duration(lap.total_time_seconds),
            format_distance(lap.distance_meters),
            lap.trigger_method,
            lap.track.len()
        ));
    }

    body.push_str("</tbody></table></div>");
    body.push_str("</section>");
    body
}
