use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use courier_optimizer::solution::Solution;

use crate::input::ProblemInput;

/// `HH:MM:SS` for a number of seconds since midnight.
pub fn format_time_of_day(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// One row per visit, stops labelled with their input position and place.
pub fn solution_table(input: &ProblemInput, solution: &Solution) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec![
        "Vehicle", "Stop", "Place", "Window", "Arrival",
    ]);

    for route in &solution.routes {
        for visit in &route.visits {
            let (stop, place, window) = if visit.node.is_depot() {
                ("depot".to_owned(), input.depot.to_string(), String::new())
            } else {
                // Stop `k` of the input is node `k + 1`
                let index = visit.node.get() - 1;
                let stop = &input.stops[index];
                (
                    index.to_string(),
                    stop.place.to_string(),
                    format!("{} - {}", stop.start_time, stop.end_time),
                )
            };

            table.add_row(vec![
                route.vehicle.to_string(),
                stop,
                place,
                window,
                format_time_of_day(visit.arrival),
            ]);
        }
    }

    table
}
