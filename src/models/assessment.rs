//! Risk assessment model and the Stage 1 heuristic classifier

use serde::Serialize;

use super::StudentRecord;

const HIGH_RISK_JUSTIFICATION: &str =
    "Low GPA or poor attendance are strong indicators of high academic risk.";
const MEDIUM_RISK_JUSTIFICATION: &str =
    "Student's GPA is average. Monitor for potential decline.";
const LOW_RISK_JUSTIFICATION: &str = "Student is performing well across key metrics.";

const HIGH_RISK_GPA: f64 = 2.5;
const HIGH_RISK_ATTENDANCE: i32 = 60;
const MEDIUM_RISK_GPA: f64 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A record paired with its predicted risk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub student_details: StudentRecord,
    pub predicted_risk: RiskLevel,
    pub justification: String,
}

/// Classify one student.
///
/// Rules are checked in order and the first match wins. All thresholds are
/// strict, so a GPA of exactly 2.5 is Medium and exactly 3.5 is Low.
/// Lab access, coding hours and commute impact are collected for a future
/// model and deliberately play no part here.
pub fn classify(student: &StudentRecord) -> RiskAssessment {
    let gpa = student.cumulative_gpa();

    let (predicted_risk, justification) =
        if gpa < HIGH_RISK_GPA || student.attendance_percentage() < HIGH_RISK_ATTENDANCE {
            (RiskLevel::High, HIGH_RISK_JUSTIFICATION)
        } else if gpa < MEDIUM_RISK_GPA {
            (RiskLevel::Medium, MEDIUM_RISK_JUSTIFICATION)
        } else {
            (RiskLevel::Low, LOW_RISK_JUSTIFICATION)
        };

    RiskAssessment {
        student_details: student.clone(),
        predicted_risk,
        justification: justification.to_string(),
    }
}

/// Assess every student, keeping input order.
pub fn assess_all(students: &[StudentRecord]) -> Vec<RiskAssessment> {
    students.iter().map(classify).collect()
}
