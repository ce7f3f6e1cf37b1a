use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::timestamp;
use crate::model::user::User;

pub const MAX_CV_PROFILES: u64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: String,
    pub highlights: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvEducation {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub current: bool,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
        }
    }

    /// Share of the skill bar that is filled.
    pub fn fill(self) -> f32 {
        match self {
            SkillLevel::Beginner => 0.25,
            SkillLevel::Intermediate => 0.5,
            SkillLevel::Advanced => 0.75,
            SkillLevel::Expert => 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvSkill {
    pub name: String,
    pub level: SkillLevel,
    pub years_of_experience: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Elementary,
    #[serde(rename = "Limited Working")]
    LimitedWorking,
    #[default]
    #[serde(rename = "Professional Working")]
    ProfessionalWorking,
    #[serde(rename = "Full Professional")]
    FullProfessional,
    #[serde(rename = "Native/Bilingual")]
    Native,
}

impl Proficiency {
    pub fn as_str(self) -> &'static str {
        match self {
            Proficiency::Elementary => "Elementary",
            Proficiency::LimitedWorking => "Limited Working",
            Proficiency::ProfessionalWorking => "Professional Working",
            Proficiency::FullProfessional => "Full Professional",
            Proficiency::Native => "Native/Bilingual",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvLanguage {
    pub name: String,
    pub proficiency: Proficiency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: Option<String>,
    pub expires: Option<String>,
    pub has_expiry: bool,
    pub credential_id: String,
    #[serde(rename = "credentialURL")]
    pub credential_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvProject {
    pub title: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: bool,
    pub url: String,
    pub repository_url: String,
    pub technologies: Vec<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Publication {
    pub title: String,
    pub publisher: String,
    pub date: Option<String>,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomItem {
    pub title: String,
    pub subtitle: String,
    pub date: Option<String>,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomSection {
    pub title: String,
    pub items: Vec<CustomItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeLayout {
    #[default]
    Standard,
    Modern,
    Creative,
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    pub layout: ThemeLayout,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            primary_color: "#4e54c8".to_string(),
            secondary_color: "#8f94fb".to_string(),
            font_family: "Segoe UI, Tahoma, Geneva, Verdana, sans-serif".to_string(),
            layout: ThemeLayout::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CvSection {
    Summary,
    WorkExperience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
    Publications,
    CustomSections,
}

impl CvSection {
    pub const DEFAULT_ORDER: [CvSection; 9] = [
        CvSection::Summary,
        CvSection::WorkExperience,
        CvSection::Education,
        CvSection::Skills,
        CvSection::Projects,
        CvSection::Certifications,
        CvSection::Languages,
        CvSection::Publications,
        CvSection::CustomSections,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CvSection::Summary => "summary",
            CvSection::WorkExperience => "workExperience",
            CvSection::Education => "education",
            CvSection::Skills => "skills",
            CvSection::Projects => "projects",
            CvSection::Certifications => "certifications",
            CvSection::Languages => "languages",
            CvSection::Publications => "publications",
            CvSection::CustomSections => "customSections",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            CvSection::Summary => "Professional Summary",
            CvSection::WorkExperience => "Work Experience",
            CvSection::Education => "Education",
            CvSection::Skills => "Skills",
            CvSection::Projects => "Projects",
            CvSection::Certifications => "Certifications",
            CvSection::Languages => "Languages",
            CvSection::Publications => "Publications",
            CvSection::CustomSections => "Additional Information",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        CvSection::DEFAULT_ORDER.into_iter().find(|section| section.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    pub show_profile_image: bool,
    pub show_contact: bool,
    /// Section keys; unknown keys are ignored when rendering
    pub sections_order: Vec<String>,
    pub hidden_sections: Vec<String>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            show_profile_image: true,
            show_contact: true,
            sections_order: CvSection::DEFAULT_ORDER.iter().map(|s| s.key().to_string()).collect(),
            hidden_sections: Vec::new(),
        }
    }
}

/// Profile sections `POST /sync` can copy from the user's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncSection {
    BasicInfo,
    Education,
    Experience,
    Skills,
    Languages,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<CvEducation>,
    #[serde(default)]
    pub skills: Vec<CvSkill>,
    #[serde(default)]
    pub languages: Vec<CvLanguage>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub projects: Vec<CvProject>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub custom_sections: Vec<CustomSection>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub display_options: DisplayOptions,
    pub created_at: String,
    pub updated_at: String,
}

fn default_title() -> String {
    "My CV".to_string()
}

impl CvProfile {
    pub fn new(user_id: ObjectId, full_name: String, title: String) -> Self {
        let now = timestamp();
        CvProfile {
            id: None,
            user_id,
            title,
            full_name,
            profile_image: String::new(),
            is_public: false,
            is_default: false,
            headline: String::new(),
            summary: String::new(),
            contact: Contact::default(),
            work_experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            certifications: Vec::new(),
            projects: Vec::new(),
            publications: Vec::new(),
            custom_sections: Vec::new(),
            theme: Theme::default(),
            display_options: DisplayOptions::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp();
    }

    /// A fresh, non-default copy titled "<title> (Copy)".
    pub fn duplicate(&self) -> CvProfile {
        let now = timestamp();
        CvProfile {
            id: None,
            title: format!("{} (Copy)", self.title),
            is_default: false,
            created_at: now.clone(),
            updated_at: now,
            ..self.clone()
        }
    }

    /// Sections to render, in the configured order, minus hidden ones.
    pub fn visible_sections(&self) -> Vec<CvSection> {
        let opts = &self.display_options;
        let mut order: Vec<CvSection> = opts.sections_order.iter().filter_map(|k| CvSection::from_key(k)).collect();
        if order.is_empty() {
            order = CvSection::DEFAULT_ORDER.to_vec();
        }
        let mut seen = Vec::with_capacity(order.len());
        for section in order {
            if !seen.contains(&section) && !opts.hidden_sections.iter().any(|h| h == section.key()) {
                seen.push(section);
            }
        }
        seen
    }

    /// Copies the requested parts of the user's profile into this CV.
    pub fn sync_from_user(&mut self, user: &User, sections: &[SyncSection]) {
        if sections.contains(&SyncSection::BasicInfo) {
            self.full_name = user.display_name().to_string();
            self.headline = user.area_of_expertise.clone();
            self.summary = user.bio.clone();
            self.contact = Contact {
                email: user.email.clone(),
                phone: String::new(),
                location: String::new(),
                website: user.portfolio.clone(),
            };
        }
        if sections.contains(&SyncSection::Education) && !user.education.is_empty() {
            self.education = user
                .education
                .iter()
                .map(|edu| CvEducation {
                    institution: edu.institution.clone(),
                    degree: edu.degree.clone(),
                    field_of_study: edu.field_of_study.clone(),
                    start_year: edu.start_year,
                    end_year: edu.end_year,
                    current: edu.end_year.is_none(),
                    ..CvEducation::default()
                })
                .collect();
        }
        if sections.contains(&SyncSection::Experience) && !user.experience.is_empty() {
            self.work_experience = user
                .experience
                .iter()
                .map(|exp| WorkExperience {
                    title: exp.position.clone(),
                    company: exp.company.clone(),
                    start_date: exp.start_date.clone(),
                    end_date: exp.end_date.clone(),
                    current: exp.end_date.is_none(),
                    description: exp.description.clone(),
                    ..WorkExperience::default()
                })
                .collect();
        }
        if sections.contains(&SyncSection::Skills) && !user.skills.is_empty() {
            self.skills = user
                .skills
                .iter()
                .map(|name| CvSkill { name: name.clone(), level: SkillLevel::Intermediate, years_of_experience: Some(1) })
                .collect();
        }
        if sections.contains(&SyncSection::Languages) && !user.favorite_languages.is_empty() {
            self.languages = user
                .favorite_languages
                .iter()
                .map(|name| CvLanguage { name: name.clone(), proficiency: Proficiency::ProfessionalWorking })
                .collect();
        }
        self.touch();
    }
}
