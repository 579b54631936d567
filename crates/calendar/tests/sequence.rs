use hydromet_calendar::{DateHour, DayWindow, timesteps};

fn dh(y: u16, m: u16, d: u16, h: u16) -> DateHour {
    DateHour::new(y, m, d, h).unwrap()
}

#[test]
fn hourly_day_has_24_steps() {
    let steps = timesteps(dh(2020, 6, 1, 0), dh(2020, 6, 2, 0), 1);
    assert_eq!(steps.len(), 24);
    assert_eq!(steps[0], dh(2020, 6, 1, 0));
    assert_eq!(steps[23], dh(2020, 6, 1, 23));
}

#[test]
fn three_hourly_over_year_end() {
    let steps = timesteps(dh(2020, 12, 31, 18), dh(2021, 1, 1, 6), 3);
    assert_eq!(
        steps,
        vec![
            dh(2020, 12, 31, 18),
            dh(2020, 12, 31, 21),
            dh(2021, 1, 1, 0),
            dh(2021, 1, 1, 3),
        ]
    );
}

#[test]
fn snapped_window_covers_full_days() {
    let window = DayWindow::snap(dh(2020, 2, 28, 13), dh(2020, 3, 1, 5));
    let steps = timesteps(window.start(), window.end(), 6);
    // Feb 28, Feb 29 and Mar 1, four steps each.
    assert_eq!(steps.len(), 12);
    assert_eq!(steps[0].hour(), 0);
    assert_eq!(steps[11], dh(2020, 3, 1, 18));
}
