//! Built-in teaching cases used when no snapshot exists.

use nursesim_core::{
    CaseCriterion, CriterionCategory, Difficulty, Gender, PatientCase, PatientProfile,
};

/// The starter scenarios every fresh install ships with.
pub fn seed_cases() -> Vec<PatientCase> {
    vec![chest_pain_crisis(), pediatric_fever()]
}

fn chest_pain_crisis() -> PatientCase {
    PatientCase {
        id: "case-001".to_string(),
        title: "Chest Pain Crisis (วิกฤตอาการเจ็บหน้าอก)".to_string(),
        difficulty: Difficulty::Intermediate,
        profile: PatientProfile {
            name: "นายสมชาย รักดี".to_string(),
            age: 55,
            gender: Gender::Male,
            chief_complaint: "เจ็บแน่นหน้าอกมาประมาณ 2 ชั่วโมง".to_string(),
            avatar_url: None,
            detailed_background: "อดีตข้าราชการครู สูบบุหรี่จัดมา 20 ปี มีประวัติครอบครัวเป็นโรคหัวใจ เริ่มเจ็บหน้าอกขณะกำลังทำสวนหลังบ้าน".to_string(),
            personality: "วิตกกังวล พูดสั้นๆ เพราะเหนื่อยหอบ".to_string(),
        },
        criteria: vec![
            CaseCriterion {
                id: "crit-1".to_string(),
                category: CriterionCategory::PresentIllness,
                label: "ลักษณะการเจ็บ (PQRST - Quality)".to_string(),
                keywords: vec![
                    "ลักษณะการเจ็บ".to_string(),
                    "เจ็บแบบไหน".to_string(),
                    "เจ็บอย่างไร".to_string(),
                    "แน่น".to_string(),
                ],
                expected_response: "มันเจ็บแน่นๆ เหมือนมีคนเอาหินมาทับหน้าอกเลยครับ หายใจลำบากด้วย".to_string(),
            },
            CaseCriterion {
                id: "crit-2".to_string(),
                category: CriterionCategory::PresentIllness,
                label: "การร้าวของอาการเจ็บ (PQRST - Region)".to_string(),
                keywords: vec![
                    "ร้าวไปไหน".to_string(),
                    "เจ็บตรงไหนบ้าง".to_string(),
                    "แขน".to_string(),
                    "กราม".to_string(),
                ],
                expected_response: "มันร้าวขึ้นไปที่กราม แล้วก็ลงไปที่แขนซ้ายครับ".to_string(),
            },
            CaseCriterion {
                id: "crit-3".to_string(),
                category: CriterionCategory::PastHistory,
                label: "โรคประจำตัว".to_string(),
                keywords: vec![
                    "โรคประจำตัว".to_string(),
                    "ความดัน".to_string(),
                    "เบาหวาน".to_string(),
                ],
                expected_response: "มีความดันโลหิตสูงครับ กินยาบ้างไม่กินบ้าง แล้วแต่จะนึกได้".to_string(),
            },
            CaseCriterion {
                id: "crit-4".to_string(),
                category: CriterionCategory::SocialHistory,
                label: "ประวัติการสูบบุหรี่".to_string(),
                keywords: vec!["สูบบุหรี่".to_string(), "บุหรี่".to_string()],
                expected_response: "สูบวันละซองครับ สูบมาตั้งแต่วัยรุ่นแล้ว หมอก็บอกให้เลิกแต่ยังทำไม่ได้".to_string(),
            },
        ],
        expected_diagnosis: Some(
            "กล้ามเนื้อหัวใจขาดเลือดเฉียบพลัน (Acute Myocardial Infarction)".to_string(),
        ),
        diagnosis_rationale: Some(
            "ผู้ป่วยมีปัจจัยเสี่ยงคือเพศชาย อายุมาก และสูบบุหรี่จัด อาการเจ็บหน้าอกเกิดขึ้นขณะออกแรง และมีลักษณะเจ็บแน่นเหมือนมีอะไรทับ ร่วมกับมีอาการร้าวไปที่กรามและแขนซ้าย ซึ่งเป็นอาการคลาสสิกของโรคหัวใจขาดเลือด".to_string(),
        ),
    }
}

fn pediatric_fever() -> PatientCase {
    PatientCase {
        id: "case-002".to_string(),
        title: "Pediatric Fever (ไข้ในเด็ก)".to_string(),
        difficulty: Difficulty::Beginner,
        profile: PatientProfile {
            name: "คุณมะลิ (มารดาของน้องแก้ม)".to_string(),
            age: 30,
            gender: Gender::Female,
            chief_complaint: "ลูกสาวตัวร้อนจัดและมีผื่นขึ้นตามตัว".to_string(),
            avatar_url: None,
            detailed_background: "คุณแม่กังวลมาก น้องแก้มอายุ 5 ขวบ มีไข้สูงมา 3 วัน กินยาลดไข้แล้วไม่ดีขึ้น วันนี้เริ่มมีผื่นแดงขึ้นที่หน้าและลำตัว".to_string(),
            personality: "ขี้กังวล ตอบละเอียด รักลูกมาก".to_string(),
        },
        criteria: vec![
            CaseCriterion {
                id: "crit-5".to_string(),
                category: CriterionCategory::PresentIllness,
                label: "ระยะเวลาของไข้".to_string(),
                keywords: vec![
                    "เป็นมานานแค่ไหน".to_string(),
                    "มีไข้กี่วัน".to_string(),
                    "ไข้สูง".to_string(),
                ],
                expected_response: "น้องมีไข้มา 3 วันแล้วค่ะ ตัวร้อนจี๋ตลอดเลย".to_string(),
            },
            CaseCriterion {
                id: "crit-6".to_string(),
                category: CriterionCategory::PastHistory,
                label: "ประวัติการแพ้ยา".to_string(),
                keywords: vec!["แพ้ยา".to_string(), "แพ้อะไรไหม".to_string()],
                expected_response: "น้องแพ้ยาเพนิซิลลินค่ะ เคยฉีดแล้วผื่นขึ้นทั้งตัวเลย".to_string(),
            },
        ],
        expected_diagnosis: Some("โรคหัด (Measles)".to_string()),
        diagnosis_rationale: Some(
            "เด็กมีอาการไข้สูงติดต่อกันหลายวัน มีผื่นแดงเริ่มขึ้นจากใบหน้าลามไปตามลำตัว ร่วมกับมีประวัติยังได้รับวัคซีนไม่ครบตามเกณฑ์".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_cases_are_valid() {
        let cases = seed_cases();
        assert_eq!(cases.len(), 2);
        for case in &cases {
            case.validate().unwrap();
        }
    }

    #[test]
    fn test_seed_ids_are_stable_and_unique() {
        let cases = seed_cases();
        assert_eq!(cases[0].id, "case-001");
        assert_eq!(cases[1].id, "case-002");
        let crit_ids: Vec<&str> = cases
            .iter()
            .flat_map(|c| c.criteria.iter().map(|cr| cr.id.as_str()))
            .collect();
        let unique: std::collections::HashSet<&&str> = crit_ids.iter().collect();
        assert_eq!(unique.len(), crit_ids.len());
    }
}
