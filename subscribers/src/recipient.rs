use bus_schedule::outage::BusNumber;
use shared_kernel::string_key;

string_key!(PhoneNumber);

/// Someone subscribed to outages of one bus serving one school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub phone_number: PhoneNumber,
    pub bus: BusNumber,
    pub school: String,
    /// Also wants a message when the bus is running normally.
    pub always_notify: bool,
}

impl Recipient {
    /// Builds a recipient from `phone | bus | school [| always]`.
    /// Returns `None` when fewer than three fields are present. The always
    /// flag is set only by `t`/`T`; a missing fourth field means `false`.
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        match fields {
            [phone_number, bus, school, rest @ ..] => Some(Recipient {
                phone_number: PhoneNumber::from(*phone_number),
                bus: BusNumber::from(*bus),
                school: school.trim().to_string(),
                always_notify: rest
                    .first()
                    .map(|flag| flag.trim().eq_ignore_ascii_case("t"))
                    .unwrap_or(false),
            }),
            _ => None,
        }
    }
}
