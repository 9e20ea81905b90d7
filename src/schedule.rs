use crate::error::Error;
use crate::model::*;
use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, info, instrument, trace, warn};

type Booking = (NaiveDate, String, String);

/// Complete `(date, time, room)` triples currently held by projects.
fn bookings(roster: &Roster) -> HashSet<Booking> {
    roster
        .projects
        .iter()
        .filter_map(|p| p.defense.booking())
        .map(|(d, t, r)| (d, t.to_owned(), r.to_owned()))
        .collect()
}

/// Configured rooms that no other project occupies at `date` and `time`,
/// in configuration order. The booking of `excluding`, if any, is ignored so
/// that a project can be moved within the same slot.
pub fn available_rooms(
    roster: &Roster,
    settings: &DefenseSettings,
    date: NaiveDate,
    time: &str,
    excluding: Option<&ProjectId>,
) -> Vec<String> {
    let booked = roster
        .projects
        .iter()
        .filter(|p| Some(&p.id) != excluding)
        .filter_map(|p| p.defense.booking())
        .filter(|&(d, t, _)| d == date && t == time)
        .map(|(_, _, r)| r)
        .collect::<HashSet<_>>();
    settings
        .rooms
        .iter()
        .filter(|r| !booked.contains(r.as_str()))
        .cloned()
        .collect()
}

/// Replace the defense slot of a project. Fields may be left empty and no
/// double-booking check is made here.
pub fn assign_defense<'a>(
    roster: &'a mut Roster,
    project: &ProjectId,
    slot: DefenseSlot,
) -> Result<&'a Project, Error> {
    let p = roster.require_project_mut(project)?;
    debug!(project = %p.id, %slot, "setting defense slot");
    p.defense = slot;
    Ok(&*p)
}

pub fn clear_defense<'a>(
    roster: &'a mut Roster,
    project: &ProjectId,
) -> Result<&'a Project, Error> {
    assign_defense(roster, project, DefenseSlot::default())
}

/// Remove every defense slot and committee member from the roster.
pub fn clear_all(roster: &mut Roster) {
    for p in &mut roster.projects {
        p.defense = DefenseSlot::default();
        p.committee.clear();
    }
    info!("cleared schedules and committees of {} projects", roster.projects.len());
}

/// First free slot compatible with the fields `fixed` already holds, trying
/// dates from `first` to `last`, then time slots and rooms in configuration
/// order. A held field outside the search window or the configured lists is
/// searched as if it were missing.
fn first_free_slot(
    settings: &DefenseSettings,
    occupied: &HashSet<Booking>,
    fixed: &DefenseSlot,
    first: NaiveDate,
    last: NaiveDate,
) -> Option<Booking> {
    let dates = match fixed.date {
        Some(date) if date >= first => vec![date],
        _ => first.iter_days().take_while(|d| *d <= last).collect(),
    };
    let times = match &fixed.time {
        Some(time) if settings.time_slots.contains(time) => vec![time.clone()],
        _ => settings.time_slots.clone(),
    };
    let rooms = match &fixed.room {
        Some(room) if settings.rooms.contains(room) => vec![room.clone()],
        _ => settings.rooms.clone(),
    };
    for date in dates {
        for time in &times {
            for room in &rooms {
                let booking = (date, time.clone(), room.clone());
                if !occupied.contains(&booking) {
                    return Some(booking);
                }
            }
        }
    }
    None
}

/// Give a complete slot to every project lacking one, in project id order,
/// using the first free `(date, time, room)` from the configured start date.
/// Fields already set on a partially scheduled project are kept when they fit
/// the settings. Return the number of projects which got fully scheduled.
#[instrument(skip_all)]
pub fn auto_schedule(roster: &mut Roster, settings: &DefenseSettings) -> usize {
    let pending = roster
        .project_order()
        .into_iter()
        .filter(|&i| !roster.projects[i].defense.is_complete())
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return 0;
    }
    if settings.slots_per_day() == 0 {
        warn!("no time slot or no room configured, cannot schedule defenses");
        return 0;
    }
    let dates = roster
        .projects
        .iter()
        .filter_map(|p| p.defense.date)
        .collect::<Vec<_>>();
    let Some(first) = settings
        .start_defense_date
        .or_else(|| dates.iter().min().copied())
    else {
        warn!("no defense start date configured, cannot schedule defenses");
        return 0;
    };
    // Every day after the latest one in use is free, so one extra day per
    // pending project always leaves room for each of them.
    let latest = dates.iter().max().map_or(first, |&d| d.max(first));
    let last = latest
        .checked_add_days(Days::new(pending.len() as u64))
        .unwrap_or(NaiveDate::MAX);
    debug!(%first, %last, pending = pending.len(), "searching defense slots");
    let mut occupied = bookings(roster);
    let mut scheduled = 0;
    for idx in pending {
        let project = &roster.projects[idx];
        match first_free_slot(settings, &occupied, &project.defense, first, last) {
            Some(booking) => {
                let (date, time, room) = booking.clone();
                trace!(project = %project.id, %date, %time, %room, "scheduling defense");
                occupied.insert(booking);
                roster.projects[idx].defense = DefenseSlot::new(date, time, room);
                scheduled += 1;
            }
            None => debug!(project = %project.id, "no free defense slot"),
        }
    }
    info!("{scheduled} defenses scheduled");
    scheduled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use proptest::prelude::*;

    fn settings(slots: &str, rooms: &[&str]) -> DefenseSettings {
        DefenseSettings::new(slots, rooms, Some(date(2024, 6, 1)))
    }

    fn slot_of(roster: &Roster, id: &str) -> DefenseSlot {
        roster.project(&id.into()).unwrap().defense.clone()
    }

    #[test]
    fn test_two_projects_one_slot() {
        let mut roster = Roster::new(
            vec![],
            vec![project("P-002", "Dr. Lee", &[]), project("P-001", "Dr. Lee", &[])],
        );
        assert_eq!(auto_schedule(&mut roster, &settings("09:00", &["R1"])), 2);
        assert_eq!(
            slot_of(&roster, "P-001"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R1")
        );
        assert_eq!(
            slot_of(&roster, "P-002"),
            DefenseSlot::new(date(2024, 6, 2), "09:00", "R1")
        );
    }

    #[test]
    fn test_enumeration_order() {
        let mut roster = sample_roster();
        let settings = settings("09:00, 13:00", &["R1", "R2"]);
        assert_eq!(auto_schedule(&mut roster, &settings), 4);
        assert_eq!(
            slot_of(&roster, "P-001"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R1")
        );
        assert_eq!(
            slot_of(&roster, "P-002"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R2")
        );
        assert_eq!(
            slot_of(&roster, "P-003"),
            DefenseSlot::new(date(2024, 6, 1), "13:00", "R1")
        );
        assert_eq!(
            slot_of(&roster, "P-004"),
            DefenseSlot::new(date(2024, 6, 1), "13:00", "R2")
        );
        assert_eq!(auto_schedule(&mut roster, &settings), 0);
    }

    #[test]
    fn test_existing_bookings_avoided() {
        let mut roster = sample_roster();
        roster.projects[0].defense = DefenseSlot::new(date(2024, 6, 1), "09:00", "R1");
        // Booked before the start date, stays untouched.
        roster.projects[2].defense = DefenseSlot::new(date(2024, 5, 20), "09:00", "R1");
        assert_eq!(auto_schedule(&mut roster, &settings("09:00", &["R1"])), 2);
        assert_eq!(
            slot_of(&roster, "P-001"),
            DefenseSlot::new(date(2024, 6, 2), "09:00", "R1")
        );
        assert_eq!(
            slot_of(&roster, "P-002"),
            DefenseSlot::new(date(2024, 6, 3), "09:00", "R1")
        );
        assert_eq!(
            slot_of(&roster, "P-004"),
            DefenseSlot::new(date(2024, 5, 20), "09:00", "R1")
        );
    }

    #[test]
    fn test_partial_schedule_kept() {
        let mut roster = sample_roster();
        roster.projects[1].defense.room = Some("R2".into());
        roster.projects[3].defense.date = Some(date(2024, 6, 5));
        assert_eq!(
            auto_schedule(&mut roster, &settings("09:00, 13:00", &["R1", "R2"])),
            4
        );
        assert_eq!(
            slot_of(&roster, "P-001"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R2")
        );
        assert_eq!(
            slot_of(&roster, "P-002"),
            DefenseSlot::new(date(2024, 6, 5), "09:00", "R1")
        );
        assert_eq!(
            slot_of(&roster, "P-003"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R1")
        );
    }

    #[test]
    fn test_partial_date_before_start_is_searched() {
        let mut roster = Roster::new(vec![], vec![project("P-001", "Dr. Lee", &[])]);
        roster.projects[0].defense.date = Some(date(2024, 5, 1));
        assert_eq!(auto_schedule(&mut roster, &settings("09:00", &["R1"])), 1);
        assert_eq!(
            slot_of(&roster, "P-001"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R1")
        );
    }

    #[test]
    fn test_partial_room_not_configured_is_searched() {
        let mut roster = Roster::new(vec![], vec![project("P-001", "Dr. Lee", &[])]);
        roster.projects[0].defense.room = Some("Old Hall".into());
        assert_eq!(auto_schedule(&mut roster, &settings("09:00", &["R1"])), 1);
        assert_eq!(
            slot_of(&roster, "P-001"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R1")
        );
    }

    #[test]
    fn test_partial_time_not_configured_is_searched() {
        let mut roster = Roster::new(vec![], vec![project("P-001", "Dr. Lee", &[])]);
        roster.projects[0].defense.time = Some("07:30".into());
        roster.projects[0].defense.room = Some("R2".into());
        assert_eq!(
            auto_schedule(&mut roster, &settings("09:00, 13:00", &["R1", "R2"])),
            1
        );
        assert_eq!(
            slot_of(&roster, "P-001"),
            DefenseSlot::new(date(2024, 6, 1), "09:00", "R2")
        );
    }

    #[test]
    fn test_fixed_room_and_time_advance_dates() {
        let mut roster = sample_roster();
        for p in &mut roster.projects {
            p.defense.time = Some("09:00".into());
            p.defense.room = Some("R1".into());
        }
        assert_eq!(
            auto_schedule(&mut roster, &settings("09:00, 13:00", &["R1", "R2"])),
            4
        );
        let mut dates = roster
            .projects
            .iter()
            .map(|p| p.defense.date.unwrap())
            .collect::<Vec<_>>();
        dates.sort();
        assert_eq!(
            dates,
            vec![date(2024, 6, 1), date(2024, 6, 2), date(2024, 6, 3), date(2024, 6, 4)]
        );
    }

    #[test]
    fn test_no_placement_possible() {
        let mut roster = sample_roster();
        assert_eq!(auto_schedule(&mut roster, &settings("", &["R1"])), 0);
        assert_eq!(auto_schedule(&mut roster, &settings("09:00", &[])), 0);
        let unset = DefenseSettings::new("09:00", &["R1"], None);
        assert_eq!(auto_schedule(&mut roster, &unset), 0);
        assert!(roster.projects.iter().all(|p| p.defense == DefenseSlot::default()));
    }

    #[test]
    fn test_start_falls_back_to_earliest_booking() {
        let mut roster = sample_roster();
        roster.projects[1].defense = DefenseSlot::new(date(2024, 7, 1), "09:00", "R1");
        let unset = DefenseSettings::new("09:00", &["R1"], None);
        assert_eq!(auto_schedule(&mut roster, &unset), 3);
        assert_eq!(
            slot_of(&roster, "P-002"),
            DefenseSlot::new(date(2024, 7, 2), "09:00", "R1")
        );
    }

    #[test]
    fn test_pre_existing_conflict_left_alone() {
        let mut roster = sample_roster();
        let taken = DefenseSlot::new(date(2024, 6, 1), "09:00", "R1");
        roster.projects[0].defense = taken.clone();
        roster.projects[1].defense = taken.clone();
        assert_eq!(auto_schedule(&mut roster, &settings("09:00", &["R1"])), 2);
        assert_eq!(slot_of(&roster, "P-001"), taken);
        assert_eq!(slot_of(&roster, "P-003"), taken);
        assert_eq!(
            slot_of(&roster, "P-002"),
            DefenseSlot::new(date(2024, 6, 2), "09:00", "R1")
        );
    }

    #[test]
    fn test_available_rooms() {
        let mut roster = sample_roster();
        let settings = settings("09:00, 13:00", &["R1", "R2", "R3"]);
        let day = date(2024, 6, 1);
        assign_defense(&mut roster, &"P-001".into(), DefenseSlot::new(day, "09:00", "R2")).unwrap();
        assign_defense(&mut roster, &"P-002".into(), DefenseSlot::new(day, "13:00", "R1")).unwrap();
        // Partial schedules hold nothing.
        roster.projects[0].defense = DefenseSlot {
            date: Some(day),
            time: Some("09:00".into()),
            room: None,
        };
        assert_eq!(available_rooms(&roster, &settings, day, "09:00", None), vec!["R1", "R3"]);
        assert_eq!(
            available_rooms(&roster, &settings, day, "09:00", Some(&"P-001".into())),
            vec!["R1", "R2", "R3"]
        );
        assert_eq!(available_rooms(&roster, &settings, day, "13:00", None), vec!["R2", "R3"]);
        assert_eq!(
            available_rooms(&roster, &settings, date(2024, 6, 2), "09:00", None),
            vec!["R1", "R2", "R3"]
        );
    }

    #[test]
    fn test_manual_and_clear() {
        let mut roster = sample_roster();
        let p = assign_defense(
            &mut roster,
            &"P-003".into(),
            DefenseSlot {
                date: Some(date(2024, 6, 1)),
                time: None,
                room: None,
            },
        )
        .unwrap();
        assert_eq!(p.defense.state(), ScheduleState::PartiallyScheduled);
        let p = clear_defense(&mut roster, &"P-003".into()).unwrap();
        assert_eq!(p.defense.state(), ScheduleState::Unscheduled);
        assert!(matches!(
            clear_defense(&mut roster, &"P-999".into()),
            Err(Error::ProjectNotFound(_))
        ));
    }

    #[test]
    fn test_clear_all() {
        let mut roster = sample_roster();
        crate::committee::auto_assign(&mut roster);
        auto_schedule(&mut roster, &settings("09:00", &["R1"]));
        clear_all(&mut roster);
        for p in &roster.projects {
            assert_eq!(p.defense, DefenseSlot::default());
            assert_eq!(p.committee, Committee::default());
        }
    }

    proptest! {
        #[test]
        fn prop_auto_schedule_never_double_books(
            booked in prop::collection::vec(
                prop::option::of((0u64..4, 0usize..3, 0usize..2)),
                1..15,
            ),
        ) {
            let slots = ["08:00", "10:00", "14:00"];
            let rooms = ["R1", "R2"];
            let start = date(2024, 6, 1);
            let mut roster = Roster::default();
            for (j, b) in booked.iter().enumerate() {
                let mut p = project(&format!("P-{j:03}"), "Dr. Lee", &[]);
                if let Some((d, t, r)) = *b {
                    p.defense = DefenseSlot::new(start + Days::new(d), slots[t], rooms[r]);
                }
                roster.projects.push(p);
            }
            let before = bookings(&roster);
            let settings = DefenseSettings::new(&slots.join(","), &rooms, Some(start));
            let pending = roster.projects.iter().filter(|p| !p.defense.is_complete()).count();
            prop_assert_eq!(auto_schedule(&mut roster, &settings), pending);
            let mut seen = HashSet::new();
            for (p, b) in roster.projects.iter().zip(&booked) {
                let (d, t, r) = p.defense.booking().unwrap();
                let booking = (d, t.to_owned(), r.to_owned());
                if b.is_none() {
                    prop_assert!(d >= start);
                    prop_assert!(!before.contains(&booking));
                    prop_assert!(seen.insert(booking));
                }
            }
        }
    }
}
