//! Canned demo postings for seeding an empty board.

use chrono::{DateTime, Duration, Utc};

use crate::Job;

/// How long a sample posting stays open.
pub const SAMPLE_LIFETIME_DAYS: i64 = 30;

struct Sample {
    title: &'static str,
    company: &'static str,
    location: &'static str,
    job_type: &'static str,
    salary: &'static str,
    description: &'static str,
    requirements: &'static str,
    experience_level: &'static str,
    skills: [&'static str; 4],
    company_id: &'static str,
}

const SAMPLES: [Sample; 5] = [
    Sample {
        title: "Full Stack Developer",
        company: "Tech Corp",
        location: "New York",
        job_type: "FULL_TIME",
        salary: "$80,000 - $120,000",
        description: "We are looking for a Full Stack Developer with experience in React and Node.js.",
        requirements: "3+ years of experience with React, Node.js, and TypeScript.",
        experience_level: "MID",
        skills: ["React", "Node.js", "TypeScript", "MongoDB"],
        company_id: "tech-corp-001",
    },
    Sample {
        title: "Frontend Engineer",
        company: "Startup Inc",
        location: "San Francisco",
        job_type: "FULL_TIME",
        salary: "$90,000 - $130,000",
        description: "Join our team as a Frontend Engineer working with modern JavaScript frameworks.",
        requirements: "Experience with React, Vue.js, or Angular. Knowledge of CSS and responsive design.",
        experience_level: "SENIOR",
        skills: ["React", "Vue.js", "CSS", "JavaScript"],
        company_id: "startup-inc-001",
    },
    Sample {
        title: "Backend Developer",
        company: "Enterprise Solutions",
        location: "Remote",
        job_type: "CONTRACT",
        salary: "$70,000 - $100,000",
        description: "Backend developer needed for API development and database management.",
        requirements: "Experience with Node.js, Express, and PostgreSQL.",
        experience_level: "MID",
        skills: ["Node.js", "Express", "PostgreSQL", "REST APIs"],
        company_id: "enterprise-solutions-001",
    },
    Sample {
        title: "Part-time Web Developer",
        company: "Small Business Inc",
        location: "Chicago",
        job_type: "PART_TIME",
        salary: "$40,000 - $60,000",
        description: "Part-time web developer needed for website maintenance and updates.",
        requirements: "Experience with HTML, CSS, JavaScript, and basic PHP.",
        experience_level: "ENTRY",
        skills: ["HTML", "CSS", "JavaScript", "PHP"],
        company_id: "small-business-inc-001",
    },
    Sample {
        title: "Software Engineering Intern",
        company: "Tech Startup",
        location: "Austin",
        job_type: "INTERNSHIP",
        salary: "$25,000 - $35,000",
        description: "Internship opportunity for software engineering students.",
        requirements: "Currently enrolled in Computer Science or related field.",
        experience_level: "ENTRY",
        skills: ["Java", "Python", "Git", "Agile"],
        company_id: "tech-startup-001",
    },
];

/// The sample postings, posted at `now` and expiring 30 days later.
///
/// Returned jobs carry no id.
pub fn sample_jobs(now: DateTime<Utc>) -> Vec<Job> {
    let expiry = now + Duration::days(SAMPLE_LIFETIME_DAYS);

    SAMPLES
        .iter()
        .map(|s| Job {
            id: None,
            title: s.title.to_string(),
            company: s.company.to_string(),
            location: s.location.to_string(),
            description: s.description.to_string(),
            requirements: Some(s.requirements.to_string()),
            job_type: Some(s.job_type.to_string()),
            salary: Some(s.salary.to_string()),
            experience_level: Some(s.experience_level.to_string()),
            skills: s.skills.iter().map(|k| k.to_string()).collect(),
            posted_date: Some(now),
            expiry_date: Some(expiry),
            active: true,
            company_id: Some(s.company_id.to_string()),
            applicants: Default::default(),
        })
        .collect()
}
