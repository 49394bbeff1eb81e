use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        deriver::Deriver,
        price::PriceRecord,
        schedule::Schedule,
        time_range::{Period, TimeRange},
    },
    dispatch::Temperatures,
    quantity::rate::KilowattHourRate,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

#[must_use]
pub fn build_prices_table(
    records: &[PriceRecord],
    deriver: &Deriver,
    threshold: KilowattHourRate,
) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Start", "End", "Price", "Cheap"]);
    for record in records {
        let period = Period::half_hour_from(record.local_time(deriver.time_zone));
        let is_daytime = deriver.is_daytime(record);
        let is_cheap = is_daytime && (record.value_inc_vat < threshold);
        let mut price_cell = Cell::new(record.value_inc_vat)
            .set_alignment(CellAlignment::Right)
            .fg(if is_cheap { Color::Green } else { Color::Red });
        if !is_daytime {
            price_cell = price_cell.fg(Color::Reset).add_attribute(Attribute::Dim);
        }
        table.add_row(vec![
            Cell::new(period.start.format(TimeRange::FORMAT)),
            Cell::new(period.end.format(TimeRange::FORMAT)).add_attribute(Attribute::Dim),
            price_cell,
            Cell::new(if is_cheap { "yes" } else { "" }).fg(Color::Green),
        ]);
    }
    table
}

#[must_use]
pub fn build_schedule_table(schedule: &Schedule, temperatures: Temperatures) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "State", "Temperature"]);
    for event in schedule {
        table.add_row(vec![
            Cell::new(event.time.format(TimeRange::FORMAT)),
            Cell::new(event.target_state).fg(event.target_state.color()),
            Cell::new(temperatures.get(event.target_state)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
