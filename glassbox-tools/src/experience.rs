//! Professional experience tools.
//!
//! Static structured data about the portfolio owner's background,
//! skills, and projects, exposed both as agent tools and as the
//! `/profile` endpoint payload.

use std::future::Future;

use serde::{Deserialize, Serialize};

use glassbox_types::{Tool, ToolContext};

/// A professional experience entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    /// Employer name.
    pub company: String,
    /// Role title.
    pub title: String,
    /// Employment period, e.g. "2022 - Present".
    pub period: String,
    /// One-paragraph description of the role.
    pub description: String,
    /// Key achievements.
    pub highlights: Vec<String>,
    /// Technologies used in the role.
    pub technologies: Vec<String>,
}

/// A skill category with proficiency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCategory {
    /// Category name, e.g. "Backend Development".
    pub category: String,
    /// Skills in the category.
    pub skills: Vec<String>,
    /// One of: expert, proficient, familiar.
    pub proficiency: String,
}

/// A project entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Technologies used.
    pub technologies: Vec<String>,
    /// Key highlights.
    pub highlights: Vec<String>,
    /// Project URL, when public.
    pub url: Option<String>,
}

/// Complete professional experience response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceResponse {
    /// Experience entries, most recent first.
    pub experiences: Vec<Experience>,
    /// One-line summary.
    pub summary: String,
}

/// Complete skills response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsResponse {
    /// Skill categories.
    pub skills: Vec<SkillCategory>,
    /// One-line summary.
    pub summary: String,
}

/// Complete projects response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    /// Project entries.
    pub projects: Vec<Project>,
    /// One-line summary.
    pub summary: String,
}

/// Combined payload served by the `/profile` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Work history.
    pub experiences: Vec<Experience>,
    /// Skill categories.
    pub skills: Vec<SkillCategory>,
    /// Notable projects.
    pub projects: Vec<Project>,
}

fn experiences() -> Vec<Experience> {
    vec![
        Experience {
            company: "Meridian Data".into(),
            title: "Staff Software Engineer".into(),
            period: "2022 - Present".into(),
            description: "Leading development of agentic AI systems and production ML infrastructure.".into(),
            highlights: vec![
                "Architected a document intelligence platform processing millions of documents".into(),
                "Designed multi-tenant SaaS architecture with hot/cold storage for compliance".into(),
                "Built real-time streaming inference pipelines with sub-second latency".into(),
            ],
            technologies: vec![
                "Rust".into(),
                "Python".into(),
                "GCP".into(),
                "Cloud Run".into(),
                "PostgreSQL".into(),
            ],
        },
        Experience {
            company: "Northbeam Systems".into(),
            title: "Senior Software Engineer".into(),
            period: "2019 - 2022".into(),
            description: "Full-stack development with a focus on data-intensive applications.".into(),
            highlights: vec![
                "Built real-time data processing pipelines handling 100K+ events/second".into(),
                "Led migration from monolith to microservices architecture".into(),
                "Mentored a team of 5 engineers on best practices and code quality".into(),
            ],
            technologies: vec![
                "Rust".into(),
                "TypeScript".into(),
                "React".into(),
                "PostgreSQL".into(),
                "Kubernetes".into(),
            ],
        },
    ]
}

fn skills() -> Vec<SkillCategory> {
    vec![
        SkillCategory {
            category: "AI/ML Engineering".into(),
            skills: vec![
                "Agent architectures".into(),
                "Gemini".into(),
                "Claude".into(),
                "RAG systems".into(),
                "Streaming inference".into(),
            ],
            proficiency: "expert".into(),
        },
        SkillCategory {
            category: "Backend Development".into(),
            skills: vec![
                "Rust".into(),
                "axum".into(),
                "tokio".into(),
                "PostgreSQL".into(),
                "gRPC".into(),
                "REST APIs".into(),
            ],
            proficiency: "expert".into(),
        },
        SkillCategory {
            category: "Frontend Development".into(),
            skills: vec![
                "TypeScript".into(),
                "React".into(),
                "Next.js".into(),
                "Tailwind CSS".into(),
            ],
            proficiency: "proficient".into(),
        },
        SkillCategory {
            category: "Cloud & Infrastructure".into(),
            skills: vec![
                "GCP".into(),
                "Cloud Run".into(),
                "Docker".into(),
                "Kubernetes".into(),
                "Terraform".into(),
            ],
            proficiency: "expert".into(),
        },
    ]
}

fn projects() -> Vec<Project> {
    vec![
        Project {
            name: "Glass Box Portfolio".into(),
            description: "Production-grade demonstration of explainable, agentic systems with transparent visibility into AI decision-making.".into(),
            technologies: vec![
                "Rust".into(),
                "axum".into(),
                "Gemini".into(),
                "Next.js".into(),
                "Cloud Run".into(),
            ],
            highlights: vec![
                "Toggle between polished UX and transparent engineering view".into(),
                "Real-time Brain Log showing agent reasoning and tool execution".into(),
                "Codebase oracle answering questions about the system itself".into(),
            ],
            url: Some("https://github.com/gdeker/glassbox".into()),
        },
        Project {
            name: "DocIntel".into(),
            description: "Enterprise document intelligence platform with schema projection and compliance-ready architecture.".into(),
            technologies: vec![
                "Rust".into(),
                "Cloud Run".into(),
                "PostgreSQL".into(),
                "GCS".into(),
            ],
            highlights: vec![
                "Hot/cold architecture for fast queries and compliance storage".into(),
                "Multi-schema projection - ingest once, query many ways".into(),
                "Row-level security for multi-tenant isolation".into(),
            ],
            url: None,
        },
    ]
}

/// The combined profile payload.
pub fn profile() -> Profile {
    Profile {
        experiences: experiences(),
        skills: skills(),
        projects: projects(),
    }
}

/// Empty argument set for the data tools.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NoArgs {}

/// Tool returning work history and key achievements.
pub struct GetExperience;

impl Tool for GetExperience {
    const NAME: &'static str = "get_experience";
    type Args = NoArgs;
    type Output = ExperienceResponse;
    type Error = std::convert::Infallible;

    fn description(&self) -> &str {
        "Get professional experience and work history, with roles, responsibilities, and key achievements."
    }

    fn call(
        &self,
        _args: NoArgs,
        _ctx: &ToolContext,
    ) -> impl Future<Output = Result<ExperienceResponse, Self::Error>> + Send {
        async move {
            let experiences = experiences();
            let summary = format!(
                "{} professional experiences spanning AI/ML engineering and full-stack development.",
                experiences.len()
            );
            Ok(ExperienceResponse { experiences, summary })
        }
    }
}

/// Tool returning categorized technical skills.
pub struct GetSkills;

impl Tool for GetSkills {
    const NAME: &'static str = "get_skills";
    type Args = NoArgs;
    type Output = SkillsResponse;
    type Error = std::convert::Infallible;

    fn description(&self) -> &str {
        "Get technical skills and proficiencies, categorized with proficiency levels (expert, proficient, familiar)."
    }

    fn call(
        &self,
        _args: NoArgs,
        _ctx: &ToolContext,
    ) -> impl Future<Output = Result<SkillsResponse, Self::Error>> + Send {
        async move {
            let skills = skills();
            let summary = format!(
                "Expertise across {} skill categories, with particular depth in AI/ML engineering and backend development.",
                skills.len()
            );
            Ok(SkillsResponse { skills, summary })
        }
    }
}

/// Tool returning notable projects.
pub struct GetProjects;

impl Tool for GetProjects {
    const NAME: &'static str = "get_projects";
    type Args = NoArgs;
    type Output = ProjectsResponse;
    type Error = std::convert::Infallible;

    fn description(&self) -> &str {
        "Get notable projects and contributions, with technologies used and key highlights."
    }

    fn call(
        &self,
        _args: NoArgs,
        _ctx: &ToolContext,
    ) -> impl Future<Output = Result<ProjectsResponse, Self::Error>> + Send {
        async move {
            let projects = projects();
            let summary = format!(
                "{} notable projects demonstrating production-grade AI systems.",
                projects.len()
            );
            Ok(ProjectsResponse { projects, summary })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glassbox_types::ToolDyn;

    #[tokio::test]
    async fn experience_tool_returns_structured_data() {
        let output = GetExperience
            .call_dyn(serde_json::json!({}), &ToolContext::default())
            .await
            .unwrap();
        let structured = output.structured.unwrap();
        assert!(structured["experiences"].as_array().unwrap().len() >= 2);
        assert!(structured["summary"].as_str().unwrap().contains("experiences"));
    }

    #[tokio::test]
    async fn skills_tool_has_proficiency_levels() {
        let output = GetSkills
            .call_dyn(serde_json::json!({}), &ToolContext::default())
            .await
            .unwrap();
        let structured = output.structured.unwrap();
        for skill in structured["skills"].as_array().unwrap() {
            assert!(matches!(
                skill["proficiency"].as_str().unwrap(),
                "expert" | "proficient" | "familiar"
            ));
        }
    }

    #[test]
    fn profile_combines_all_sections() {
        let profile = profile();
        assert!(!profile.experiences.is_empty());
        assert!(!profile.skills.is_empty());
        assert!(!profile.projects.is_empty());
    }

    #[test]
    fn tool_definitions_have_names_and_schemas() {
        for def in [
            GetExperience.definition(),
            GetSkills.definition(),
            GetProjects.definition(),
        ] {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert!(def.input_schema.is_object());
        }
    }
}
