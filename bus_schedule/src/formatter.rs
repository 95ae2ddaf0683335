use crate::message::NotificationMessage;
use crate::outage::{BusNumber, OutageRow};
use itertools::Itertools;

const SEGMENT_SEPARATOR: &str = "\n\n";

pub const OUTAGE_HEADER: &str = "Affected Bus:";
pub const REVERSAL_HEADER: &str = "Bus is now running:";
pub const NO_SUB: &str = "NO SUB!";

/// Renders an outage as blank-line separated segments:
/// header, bus, time, school, substitute and impact.
pub fn format_outage(row: &OutageRow, school: &str) -> NotificationMessage {
    let sub = if row.sub_bus.trim().is_empty() {
        NO_SUB
    } else {
        row.sub_bus.as_str()
    };

    let text = [
        OUTAGE_HEADER.to_string(),
        format!("Bus # -- {}", row.bus),
        format!("Time -- {}", row.schedule),
        format!("School -- {school}"),
        format!("Sub # -- {sub}"),
        format!("Impact -- {}", row.impact.to_uppercase()),
    ]
    .join(SEGMENT_SEPARATOR);

    NotificationMessage::new(text.trim())
}

/// Turns a previously rendered outage into its "cleared" notice by swapping
/// the header and dropping the impact segment. Works on the text alone so a
/// persisted message can be reversed after its row has left the schedule.
pub fn reverse_message(message: &NotificationMessage) -> NotificationMessage {
    let segments = message.as_str().split(SEGMENT_SEPARATOR).collect_vec();
    let middle: &[&str] = if segments.len() > 2 {
        &segments[1..segments.len() - 1]
    } else {
        &[]
    };

    let text = std::iter::once(REVERSAL_HEADER)
        .chain(middle.iter().copied())
        .join(SEGMENT_SEPARATOR);
    NotificationMessage::new(text)
}

pub fn format_running_as_scheduled(bus: &BusNumber, school: &str) -> NotificationMessage {
    let school = if school.is_empty() {
        " ".to_string()
    } else {
        format!(" {} ", title_case(school))
    };
    NotificationMessage::new(format!("Bus {bus}{school}is running as scheduled."))
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                titled.extend(c.to_lowercase());
            } else {
                titled.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            titled.push(c);
            previous_is_letter = false;
        }
    }
    titled
}
