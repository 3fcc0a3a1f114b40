// src/registry/surveys.rs
//
// The built-in IPEDS survey families. Table names are matched exactly as
// stored, which in this warehouse means lowercase; NCES distributes the
// files with uppercase names (HD2020, SAL2019_IS) and the import path
// lowercases the stem.

use super::{Era, FormatChange, SurveyDefinition, TablePattern};

fn def(
    id: &str,
    pattern: TablePattern,
    description: &str,
    table_format: &str,
    format_changes: Vec<FormatChange>,
) -> SurveyDefinition {
    SurveyDefinition {
        id: id.to_string(),
        pattern,
        description: description.to_string(),
        table_format: table_format.to_string(),
        format_changes,
    }
}

pub(super) fn builtin_definitions() -> Vec<SurveyDefinition> {
    vec![
        def(
            "directory",
            TablePattern::uniform(r"^hd\d{4}$"),
            "Institutional directory: names, addresses, control, sector and \
             Carnegie classification for every Title IV institution.",
            "hd{yyyy}",
            vec![
                FormatChange::new(
                    Era::Before(2002),
                    "directory variables were bundled into the institutional \
                     characteristics files",
                ),
                FormatChange::new(Era::From(2002), "standalone hd{yyyy} file"),
            ],
        ),
        def(
            "institutional_characteristics",
            TablePattern::uniform(r"^ic\d{4}$"),
            "Institutional characteristics: offerings, services, athletics \
             and admissions-related questions.",
            "ic{yyyy}",
            vec![FormatChange::new(
                Era::From(2014),
                "admissions questions moved out into the adm{yyyy} survey",
            )],
        ),
        def(
            "student_charges",
            TablePattern::uniform(r"^ic\d{4}_ay$"),
            "Academic-year tuition, fees, room and board charges.",
            "ic{yyyy}_ay",
            vec![],
        ),
        def(
            "admissions",
            TablePattern::ByEra(vec![
                (Era::Before(2014), r"^ic\d{4}$".to_string()),
                (Era::From(2014), r"^adm\d{4}$".to_string()),
            ]),
            "Admissions and test scores: applications, admits, enrollees, \
             ACT/SAT distributions.",
            "adm{yyyy}",
            vec![
                FormatChange::new(
                    Era::Before(2014),
                    "collected as part of institutional characteristics (ic files)",
                ),
                FormatChange::new(Era::From(2014), "standalone adm{yyyy} survey component"),
            ],
        ),
        def(
            "fall_enrollment",
            TablePattern::uniform(r"^ef\d{4}.*$"),
            "Fall enrollment by race/ethnicity, gender, level and attendance \
             status (the lettered ef sub-files).",
            "ef{yyyy}a",
            vec![
                FormatChange::new(
                    Era::Before(2000),
                    "single ef file per year with fewer disaggregations",
                ),
                FormatChange::new(
                    Era::From(2000),
                    "split into lettered sub-files (a: race, b: age, c: residence, \
                     d: retention)",
                ),
                FormatChange::new(
                    Era::From(2008),
                    "new race/ethnicity categories; pre-2008 columns retired in place",
                ),
            ],
        ),
        def(
            "twelve_month_enrollment",
            TablePattern::uniform(r"^effy\d{4}$"),
            "Unduplicated 12-month headcount and instructional activity.",
            "effy{yyyy}",
            vec![],
        ),
        def(
            "completions",
            TablePattern::uniform(r"^c\d{4}_.+$"),
            "Degrees and certificates conferred, by CIP code, award level, \
             race/ethnicity and gender.",
            "c{yyyy}_a",
            vec![FormatChange::new(
                Era::From(2011),
                "second-major reporting added (c{yyyy}_b)",
            )],
        ),
        def(
            "graduation_rates",
            TablePattern::uniform(r"^gr\d{4}$"),
            "Graduation rates for the first-time full-time cohort at 150% of \
             normal time.",
            "gr{yyyy}",
            vec![],
        ),
        def(
            "salaries",
            TablePattern::uniform(r"^sal\d{4}_.+$"),
            "Instructional staff salaries by academic rank and contract length.",
            "sal{yyyy}_is",
            vec![
                FormatChange::new(
                    Era::Before(2012),
                    "sal{yyyy}_a / sal{yyyy}_b keyed by rank and 9/10/11/12-month \
                     contract columns",
                ),
                FormatChange::new(
                    Era::From(2012),
                    "sal{yyyy}_is (instructional) and sal{yyyy}_nis \
                     (non-instructional) with equated 9-month totals",
                ),
            ],
        ),
        def(
            "fall_staff",
            TablePattern::uniform(r"^s\d{4}_.+$"),
            "Fall staff headcounts by occupational category, status and \
             race/ethnicity.",
            "s{yyyy}_sis",
            vec![
                FormatChange::new(
                    Era::Before(2012),
                    "occupation-by-faculty-status sub-files (s{yyyy}_abd, s{yyyy}_f)",
                ),
                FormatChange::new(
                    Era::From(2012),
                    "reorganized around the new occupational categories \
                     (s{yyyy}_sis, s{yyyy}_oc, s{yyyy}_is)",
                ),
            ],
        ),
        def(
            "employees",
            TablePattern::uniform(r"^eap\d{4}$"),
            "Employees by assigned position: full/part time, faculty status \
             and occupational category.",
            "eap{yyyy}",
            vec![],
        ),
        def(
            "finance",
            TablePattern::uniform(r"^f\d{4}_f.+$"),
            "Institutional finance, keyed by fiscal-year span. Form depends on \
             control: f1a (GASB public), f2 (FASB private nonprofit), f3 \
             (for-profit).",
            "f{yy}{yy}_f1a",
            vec![
                FormatChange::new(
                    Era::Before(2002),
                    "single f{yy}{yy}_f1 form for public institutions",
                ),
                FormatChange::new(
                    Era::From(2002),
                    "GASB 34/35 reporting split publics onto the f1a form",
                ),
            ],
        ),
    ]
}
