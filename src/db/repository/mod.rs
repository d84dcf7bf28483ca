//! Repository layer: entity-scoped database operations.
//!
//! Allergy and medication lookups are read paths for classification;
//! their insert functions exist for seeding. Classification records are
//! append-only.

mod allergy;
mod medication;
mod record;

pub use allergy::*;
pub use medication::*;
pub use record::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use crate::models::enums::*;
    use rusqlite::Connection;
    use uuid::Uuid;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_allergy(conn: &Connection, user_id: &str, name: &str) {
        insert_allergy(conn, &Allergy {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            severity: AllergySeverity::Severe,
            symptoms: Some("hives".into()),
            diagnosed_date: Some(NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()),
        }).unwrap();
    }

    fn make_medication(conn: &Connection, user_id: &str, name: &str, active: bool) {
        insert_medication(conn, &Medication {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            dosage: "500mg".into(),
            frequency: "twice daily".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            prescribing_doctor: Some("Dr. Chen".into()),
            notes: None,
            is_active: active,
        }).unwrap();
    }

    fn drug_record(user_id: &str, drug: &str) -> NewClassificationRecord {
        NewClassificationRecord {
            user_id: user_id.into(),
            source: AssessmentSource::RuleBased,
            input: InputSnapshot::DrugRisk {
                drug_name: drug.into(),
                allergies: vec!["penicillin".into()],
            },
            assessment: Assessment::DrugRisk(DrugRiskAssessment {
                risk_level: RiskLevel::High,
                potential_reactions: vec![format!("Allergic reaction to {drug} due to penicillin allergy")],
                recommendations: vec![format!("Avoid {drug}. Consult doctor for alternatives.")],
                ai_analysis: None,
                confidence_score: None,
            }),
            upstream_error: None,
        }
    }

    #[test]
    fn allergies_scoped_to_user() {
        let conn = test_db();
        make_allergy(&conn, "alice", "Penicillin");
        make_allergy(&conn, "bob", "Sulfa");

        let alice = get_user_allergies(&conn, "alice").unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].name, "Penicillin");
        assert_eq!(alice[0].severity, AllergySeverity::Severe);
    }

    #[test]
    fn known_terms_are_case_folded_and_deduplicated() {
        let conn = test_db();
        make_allergy(&conn, "alice", "Penicillin");
        make_allergy(&conn, "alice", " penicillin ");
        make_allergy(&conn, "alice", "Latex");

        let terms = known_allergy_terms(&conn, "alice").unwrap();
        assert_eq!(terms.into_iter().collect::<Vec<_>>(), vec!["latex", "penicillin"]);
    }

    #[test]
    fn only_active_medications_returned() {
        let conn = test_db();
        make_medication(&conn, "alice", "Metformin", true);
        make_medication(&conn, "alice", "Warfarin", false);
        make_medication(&conn, "bob", "Lisinopril", true);

        let names = active_medication_names(&conn, "alice").unwrap();
        assert_eq!(names, vec!["Metformin".to_string()]);
    }

    #[test]
    fn record_insert_and_retrieve() {
        let conn = test_db();
        let stored = insert_classification_record(&conn, &drug_record("alice", "Amoxicillin")).unwrap();

        let fetched = get_classification_record(&conn, "alice", &stored.id)
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, stored.id);
        assert_eq!(fetched.kind, RecordKind::DrugRisk);
        assert_eq!(fetched.assessment, stored.assessment);
        assert_eq!(fetched.input, stored.input);
        assert_eq!(fetched.created_at, stored.created_at);
    }

    #[test]
    fn returned_record_equals_stored_record() {
        let conn = test_db();
        let mut new = drug_record("alice", "Amoxicillin");
        new.source = AssessmentSource::AiFallback;
        new.upstream_error = Some("connection refused".into());
        let stored = insert_classification_record(&conn, &new).unwrap();

        let fetched = get_classification_record(&conn, "alice", &stored.id)
            .unwrap()
            .unwrap();
        assert_eq!(fetched, stored);
        let listed = list_classification_records(&conn, "alice", None, 10).unwrap();
        assert_eq!(listed, vec![stored]);
    }

    #[test]
    fn record_not_visible_to_other_user() {
        let conn = test_db();
        let stored = insert_classification_record(&conn, &drug_record("alice", "Amoxicillin")).unwrap();
        assert!(get_classification_record(&conn, "bob", &stored.id).unwrap().is_none());
    }

    #[test]
    fn records_are_immutable() {
        let conn = test_db();
        let stored = insert_classification_record(&conn, &drug_record("alice", "Amoxicillin")).unwrap();
        let result = conn.execute(
            "UPDATE classification_records SET user_id = 'mallory' WHERE id = ?1",
            [stored.id.to_string()],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "DELETE FROM classification_records WHERE id = ?1",
            [stored.id.to_string()],
        );
        assert!(result.is_err());
        assert!(get_classification_record(&conn, "alice", &stored.id).unwrap().is_some());
    }

    #[test]
    fn list_newest_first_with_kind_filter() {
        let conn = test_db();
        insert_classification_record(&conn, &drug_record("alice", "Aspirin")).unwrap();
        insert_classification_record(&conn, &drug_record("alice", "Ibuprofen")).unwrap();
        insert_classification_record(&conn, &NewClassificationRecord {
            user_id: "alice".into(),
            source: AssessmentSource::RuleBased,
            input: InputSnapshot::Symptom {
                symptoms: "rash".into(),
                medications: vec![],
            },
            assessment: Assessment::Symptom(SymptomAssessment {
                classification: SymptomClassification::AllergicReaction,
                confidence_score: 0.55,
                ai_analysis: "rash".into(),
                recommendations: vec![],
                severity: None,
                urgency: None,
            }),
            upstream_error: None,
        }).unwrap();

        let all = list_classification_records(&conn, "alice", None, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].kind, RecordKind::Symptom);

        let drugs = list_classification_records(&conn, "alice", Some(RecordKind::DrugRisk), 10).unwrap();
        assert_eq!(drugs.len(), 2);
        match &drugs[0].input {
            InputSnapshot::DrugRisk { drug_name, .. } => assert_eq!(drug_name, "Ibuprofen"),
            other => panic!("unexpected input {other:?}"),
        }

        let limited = list_classification_records(&conn, "alice", None, 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn mismatched_snapshot_rejected() {
        let conn = test_db();
        let mut record = drug_record("alice", "Aspirin");
        record.input = InputSnapshot::Symptom {
            symptoms: "rash".into(),
            medications: vec![],
        };
        assert!(insert_classification_record(&conn, &record).is_err());
    }
}
