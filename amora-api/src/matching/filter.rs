use chrono::NaiveDate;

use crate::models::{MatchingPreferences, Profile};

use super::geo;

/// Decide whether `candidate` survives the viewer's saved matching
/// preferences.
///
/// Filtering is opt-in: a preference constrains results only when the
/// viewer actually set it (non-empty list, narrowed age range, explicit
/// distance). A candidate missing the data a filter needs is never
/// excluded by that filter. Checks are independent and conjunctive; the
/// first failure short-circuits.
pub fn passes_filters(
    candidate: &Profile,
    preferences: Option<&MatchingPreferences>,
    viewer_coords: Option<(f64, f64)>,
    today: NaiveDate,
) -> bool {
    let Some(prefs) = preferences else {
        return true;
    };

    // Age: only a narrowed range filters, and only when the candidate's
    // dob parses.
    if prefs.age_range.narrows_default() {
        if let Some(age) = candidate.dob.as_deref().and_then(|dob| geo::age_on(dob, today)) {
            if age < prefs.age_range.min || age > prefs.age_range.max {
                return false;
            }
        }
    }

    // Gender identity is a single value on the candidate side; absent
    // (including legacy opt-out sentinels) passes.
    if !prefs.gender.is_empty() {
        if let Some(identity) = candidate.gender_identity.as_deref() {
            if !prefs.gender.iter().any(|g| g == identity) {
                return false;
            }
        }
    }

    if !lists_compatible(&prefs.relationship_goals, &candidate.connection_goals) {
        return false;
    }
    if !lists_compatible(&prefs.relationship_style, &candidate.relationship_style) {
        return false;
    }
    if !lists_compatible(&prefs.sex_preferences, &candidate.sex_preferences) {
        return false;
    }

    // Family plans: single value on the candidate side.
    if !prefs.family_plans.is_empty() {
        if let Some(children) = candidate.children.as_deref() {
            if !prefs.family_plans.iter().any(|p| p == children) {
                return false;
            }
        }
    }

    // Distance needs the preference and both coordinate pairs.
    if let (Some(max_miles), Some((vlat, vlon)), Some((clat, clon))) =
        (prefs.distance, viewer_coords, candidate.coords())
    {
        if geo::haversine_miles(vlat, vlon, clat, clon) > max_miles {
            return false;
        }
    }

    true
}

/// List-valued filter: inactive when the viewer picked nothing, satisfied
/// when the candidate declared nothing, otherwise requires an overlap.
fn lists_compatible(wanted: &[String], declared: &[String]) -> bool {
    if wanted.is_empty() || declared.is_empty() {
        return true;
    }
    declared.iter().any(|d| wanted.contains(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeRange;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn dob_for_age(age: i32) -> String {
        format!("{}-01-15", 2024 - age)
    }

    fn candidate() -> Profile {
        Profile {
            full_name: "Sam".into(),
            dob: Some(dob_for_age(30)),
            gender_identity: Some("Woman".into()),
            connection_goals: vec!["Long-term".into()],
            relationship_style: vec!["Monogamy".into()],
            sex_preferences: vec!["Vanilla".into()],
            children: Some("Wants children".into()),
            latitude: Some(0.0),
            longitude: Some(1.0),
            onboarding_completed: true,
            ..Profile::default()
        }
    }

    #[test]
    fn no_preferences_passes_everyone() {
        assert!(passes_filters(&candidate(), None, None, today()));
        assert!(passes_filters(&Profile::default(), None, None, today()));
    }

    #[test]
    fn default_preferences_pass_everyone() {
        let prefs = MatchingPreferences::default();
        assert!(passes_filters(&candidate(), Some(&prefs), None, today()));
    }

    #[test]
    fn default_age_range_never_filters() {
        let prefs = MatchingPreferences::default();
        let mut very_old = candidate();
        very_old.dob = Some(dob_for_age(98));
        assert!(passes_filters(&very_old, Some(&prefs), None, today()));
    }

    #[test]
    fn narrowed_age_range_filters_by_age() {
        let prefs = MatchingPreferences {
            age_range: AgeRange { min: 25, max: 35 },
            ..MatchingPreferences::default()
        };

        let mut forty = candidate();
        forty.dob = Some(dob_for_age(40));
        assert!(!passes_filters(&forty, Some(&prefs), None, today()));

        let mut thirty = candidate();
        thirty.dob = Some(dob_for_age(30));
        assert!(passes_filters(&thirty, Some(&prefs), None, today()));
    }

    #[test]
    fn unparsable_dob_gets_benefit_of_the_doubt() {
        let prefs = MatchingPreferences {
            age_range: AgeRange { min: 25, max: 35 },
            ..MatchingPreferences::default()
        };
        let mut unknown_age = candidate();
        unknown_age.dob = Some("sometime in the 80s".into());
        assert!(passes_filters(&unknown_age, Some(&prefs), None, today()));

        unknown_age.dob = None;
        assert!(passes_filters(&unknown_age, Some(&prefs), None, today()));
    }

    #[test]
    fn gender_preference_excludes_mismatch() {
        let prefs = MatchingPreferences {
            gender: vec!["Woman".into()],
            ..MatchingPreferences::default()
        };

        let mut non_binary = candidate();
        non_binary.gender_identity = Some("Non binary".into());
        assert!(!passes_filters(&non_binary, Some(&prefs), None, today()));

        // An undisclosed gender identity is not excluded.
        let mut undisclosed = candidate();
        undisclosed.gender_identity = None;
        assert!(passes_filters(&undisclosed, Some(&prefs), None, today()));
    }

    #[test]
    fn list_preference_requires_overlap_unless_candidate_silent() {
        let prefs = MatchingPreferences {
            relationship_style: vec!["Non-monogamy".into()],
            ..MatchingPreferences::default()
        };

        assert!(!passes_filters(&candidate(), Some(&prefs), None, today()));

        let mut silent = candidate();
        silent.relationship_style = vec![];
        assert!(passes_filters(&silent, Some(&prefs), None, today()));

        let mut overlapping = candidate();
        overlapping.relationship_style = vec!["Monogamy".into(), "Non-monogamy".into()];
        assert!(passes_filters(&overlapping, Some(&prefs), None, today()));
    }

    #[test]
    fn family_plans_match_single_value() {
        let prefs = MatchingPreferences {
            family_plans: vec!["Does not want children".into()],
            ..MatchingPreferences::default()
        };

        assert!(!passes_filters(&candidate(), Some(&prefs), None, today()));

        let mut undecided = candidate();
        undecided.children = None;
        assert!(passes_filters(&undecided, Some(&prefs), None, today()));
    }

    #[test]
    fn distance_preference_uses_haversine_miles() {
        // Candidate sits one degree of longitude away: ~69.17 miles.
        let near_prefs = MatchingPreferences {
            distance: Some(100.0),
            ..MatchingPreferences::default()
        };
        let far_prefs = MatchingPreferences {
            distance: Some(1.0),
            ..MatchingPreferences::default()
        };

        let viewer = Some((0.0, 0.0));
        assert!(passes_filters(&candidate(), Some(&near_prefs), viewer, today()));
        assert!(!passes_filters(&candidate(), Some(&far_prefs), viewer, today()));
    }

    #[test]
    fn distance_skipped_without_coordinates() {
        let prefs = MatchingPreferences {
            distance: Some(1.0),
            ..MatchingPreferences::default()
        };

        // Viewer has no location.
        assert!(passes_filters(&candidate(), Some(&prefs), None, today()));

        // Candidate has no location.
        let mut nowhere = candidate();
        nowhere.latitude = None;
        assert!(passes_filters(&nowhere, Some(&prefs), Some((0.0, 0.0)), today()));
    }

    #[test]
    fn checks_are_conjunctive() {
        let prefs = MatchingPreferences {
            gender: vec!["Woman".into()],
            relationship_goals: vec!["Long-term".into()],
            ..MatchingPreferences::default()
        };

        // Passes both active filters.
        assert!(passes_filters(&candidate(), Some(&prefs), None, today()));

        // Fails one of two: excluded.
        let mut wrong_goal = candidate();
        wrong_goal.connection_goals = vec!["Casual".into()];
        assert!(!passes_filters(&wrong_goal, Some(&prefs), None, today()));
    }
}
