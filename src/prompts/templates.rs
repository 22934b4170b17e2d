use super::PromptTemplate;

/// 模板键，对应 (功能, 子模式)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    CvAnalysis,
    CvJobMatch,
    CvFollowUp,
    Code(CodeMode),
    CodeFollowUp,
    Article,
    ArticleFollowUp,
    StudyPlan,
    StudyFollowUp,
    IterativeInitial,
    IterativeRefine,
}

/// 代码助手的分析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodeMode {
    #[default]
    LineByLine,
    FixErrors,
    Optimize,
    Solve,
}

impl CodeMode {
    pub const ALL: [CodeMode; 4] = [
        CodeMode::LineByLine,
        CodeMode::FixErrors,
        CodeMode::Optimize,
        CodeMode::Solve,
    ];

    /// 面向用户的模式名称
    pub fn label(&self) -> &'static str {
        match self {
            CodeMode::LineByLine => "Line by line explanation",
            CodeMode::FixErrors => "Fix errors",
            CodeMode::Optimize => "Optimize code",
            CodeMode::Solve => "Solve coding problem",
        }
    }
}

impl std::fmt::Display for CodeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for CodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line-by-line" | "explain" | "line by line explanation" => Ok(CodeMode::LineByLine),
            "fix" | "fix-errors" | "fix errors" => Ok(CodeMode::FixErrors),
            "optimize" | "optimize code" => Ok(CodeMode::Optimize),
            "solve" | "solve coding problem" => Ok(CodeMode::Solve),
            _ => Err(format!("Unknown code mode: {}", s)),
        }
    }
}

impl TemplateKey {
    /// 获取基础模板
    pub fn template(&self) -> PromptTemplate {
        PromptTemplate::new(self.text())
    }

    /// 搜索增强时追加到基础模板的指引
    pub fn search_guidance(&self) -> Option<&'static str> {
        match self {
            TemplateKey::Article => Some(
                "Incorporate relevant information from the web search results provided",
            ),
            TemplateKey::StudyPlan => Some(
                "Use the web search results to recommend specific, current, and high-quality learning resources.",
            ),
            TemplateKey::Code(CodeMode::LineByLine) => Some(
                "Use the web search results to provide accurate information about the libraries, functions, or patterns used.",
            ),
            TemplateKey::Code(CodeMode::FixErrors) => Some(
                "Use the web search results to find accurate solutions to the errors identified.",
            ),
            TemplateKey::Code(CodeMode::Optimize) => Some(
                "Use the web search results to recommend modern optimization techniques or patterns.",
            ),
            TemplateKey::Code(CodeMode::Solve) => Some(
                "Use the web search results to find current best practices and approaches to this type of problem.",
            ),
            _ => None,
        }
    }

    /// 搜索增强版本的模板，没有指引的键返回基础模板
    ///
    /// 文章模板的指引作为Requirements的最后一条插入，其余追加在末尾。
    pub fn search_template(&self) -> PromptTemplate {
        match (self, self.search_guidance()) {
            (TemplateKey::Article, Some(guidance)) => PromptTemplate::new(ARTICLE.replacen(
                ARTICLE_LAST_REQUIREMENT,
                &format!("{}\n- {}", ARTICLE_LAST_REQUIREMENT, guidance),
                1,
            )),
            (_, Some(guidance)) => {
                PromptTemplate::new(format!("{}\n{}\n", self.text().trim_end(), guidance))
            }
            (_, None) => self.template(),
        }
    }

    fn text(&self) -> &'static str {
        match self {
            TemplateKey::CvAnalysis => CV_ANALYSIS,
            TemplateKey::CvJobMatch => CV_JOB_MATCH,
            TemplateKey::CvFollowUp => CV_FOLLOW_UP,
            TemplateKey::Code(CodeMode::LineByLine) => CODE_EXPLANATION,
            TemplateKey::Code(CodeMode::FixErrors) => CODE_ERROR_FIXING,
            TemplateKey::Code(CodeMode::Optimize) => CODE_OPTIMIZATION,
            TemplateKey::Code(CodeMode::Solve) => CODE_SOLUTION,
            TemplateKey::CodeFollowUp => CODE_FOLLOW_UP,
            TemplateKey::Article => ARTICLE,
            TemplateKey::ArticleFollowUp => ARTICLE_FOLLOW_UP,
            TemplateKey::StudyPlan => STUDY_PLAN,
            TemplateKey::StudyFollowUp => STUDY_FOLLOW_UP,
            TemplateKey::IterativeInitial => ITERATIVE_INITIAL,
            TemplateKey::IterativeRefine => ITERATIVE_REFINE,
        }
    }
}

const CV_ANALYSIS: &str = r#"
You are an expert career advisor and technical interviewer.

Analyze this CV/resume:
{cv_text}

Please provide:
1. A brief analysis of the candidate's profile (strengths/weaknesses)
2. 10 technical interview questions tailored to the candidate's background and projects
3. 5 behavioral interview questions based on their experience
4. Suggestions for skills to highlight during interviews
"#;

const CV_JOB_MATCH: &str = r#"
You are an expert career advisor and technical interviewer.

First, analyze this CV/resume:
{cv_text}

And consider this job description:
{job_description}

Please provide:
1. A brief analysis of the candidate's profile (strengths/weaknesses) in relation to the job description
2. 10 technical interview questions tailored to the candidate's skills and the job requirements
3. 5 behavioral interview questions relevant to the role
4. Suggestions for skills to highlight during the interview
"#;

const CV_FOLLOW_UP: &str = r#"
You are an expert career advisor and technical interviewer.

Context from CV: {cv_text}

Job description (if provided): {job_description}

Previous conversation:
{context}

User question: {question}

Provide a helpful, detailed response to the user's question.
"#;

const CODE_EXPLANATION: &str = r#"
You are an expert programming teacher specializing in {language}.

Analyze this code:
```{language}
{code}
```

Provide a detailed, line-by-line explanation of what this code does. For each line or logical block:
1. Show the line number or block
2. Explain what it does in detail
3. Highlight any important programming concepts demonstrated
4. Note any potential issues or improvements

Make your explanation clear and educational, as if teaching a junior developer.
"#;

const CODE_ERROR_FIXING: &str = r#"
You are an expert programming debugger specializing in {language}.

Analyze this code that may have errors:
```{language}
{code}
```

Please:
1. Identify all errors (syntax errors, logical errors, runtime errors, etc.)
2. Explain what causes each error
3. Provide a corrected version of the code
4. Explain what changes you made and why they fix the issues

Make your explanation clear and educational.
"#;

const CODE_OPTIMIZATION: &str = r#"
You are an expert programming optimizer specializing in {language}.

Analyze this code:
```{language}
{code}
```

Please:
1. Identify any performance issues or inefficiencies
2. Suggest specific optimizations with explanations
3. Provide an optimized version of the code
4. Explain the benefits of your optimizations (speed, memory usage, readability, etc.)

Make your explanation clear, educational, and focused on best practices.
"#;

const CODE_SOLUTION: &str = r#"
You are an expert programming problem solver specializing in {language}.

The user has provided a coding problem or asked for a solution. Here's their input:
```{language}
{code}
```

Please:
1. Identify the problem to be solved
2. Provide a well-structured solution in {language}
3. Explain your approach and algorithm
4. Add comments in the code to explain key steps
5. Discuss the time and space complexity if relevant

Ensure your solution is correct, efficient, and follows best practices for {language}.
"#;

const CODE_FOLLOW_UP: &str = r#"
You are an expert programming teacher specializing in {language}.

Previous code context:
{code_context}

Previous explanations:
{previous_explanations}

User question: {question}

Provide a helpful, detailed response to the user's follow-up question about the code.
Include code examples if relevant.
"#;

const ARTICLE_LAST_REQUIREMENT: &str = "- Include practical examples or case studies where appropriate";

const ARTICLE: &str = r#"
You are an expert content creator specializing in educational articles.

Please write a comprehensive article about: {topic}

Requirements:
- Word Count: Approximately {word_count} words
- Style: {style}
- Format the article with proper Markdown formatting (headers, bullet points, etc.)
- Include relevant subtopics and key concepts
- The article should be well-structured with an introduction, body, and conclusion
- Include practical examples or case studies where appropriate

Note: Temperature setting is {temperature} (0 = more factual/conservative, 1 = more creative/innovative)

Write the article now:
"#;

const ARTICLE_FOLLOW_UP: &str = r#"
You are an expert content creator specializing in educational articles.

Original article about {topic}:
{article}

User feedback/request: {request}

Please respond to the user's feedback or request. If they are asking for revisions,
provide a complete revised version of the article that incorporates their feedback.
If they are asking a question, provide a helpful and detailed answer.

Use proper Markdown formatting in your response.
"#;

const STUDY_PLAN: &str = r#"
You are an educational expert specializing in curriculum development.

Create a comprehensive study plan for:
- Subject: {subject}
- Duration: {duration_weeks} weeks
- Experience Level: {experience_level}
- Learning Goals: {goals}

Your study plan should include:
1. A week-by-week breakdown with specific topics for each week
2. Estimated hours of study per topic
3. Recommended learning resources for each topic (books, courses, websites, videos, etc.)
4. Practice exercises or projects
5. Assessment methods to track progress

Format the study plan with proper Markdown formatting:
- Use headers (## for weeks, ### for topics)
- Use bullet points for resources and activities
- Use tables where appropriate
- Include a summary at the beginning

Make the plan realistic, comprehensive, and tailored to the learner's level and goals.
"#;

const STUDY_FOLLOW_UP: &str = r#"
You are an educational expert specializing in curriculum development.

Original study plan for {subject} ({duration_weeks} weeks, {experience_level} level):
{plan}

User request: {request}

Please respond to the user's request or question. If they are asking for modifications
to the study plan, provide a complete revised version that incorporates their feedback.
If they are asking a question, provide a helpful and detailed answer.

Use proper Markdown formatting in your response.
"#;

const ITERATIVE_INITIAL: &str = r#"
{task_description}

Initial input: {input}

Please create an initial draft based on the input.
"#;

const ITERATIVE_REFINE: &str = r#"
{task_description}

Current draft:
{current_draft}

Feedback: {feedback}

Please refine the draft based on the feedback.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::TemplateFields;

    fn all_keys() -> Vec<TemplateKey> {
        let mut keys = vec![
            TemplateKey::CvAnalysis,
            TemplateKey::CvJobMatch,
            TemplateKey::CvFollowUp,
            TemplateKey::CodeFollowUp,
            TemplateKey::Article,
            TemplateKey::ArticleFollowUp,
            TemplateKey::StudyPlan,
            TemplateKey::StudyFollowUp,
            TemplateKey::IterativeInitial,
            TemplateKey::IterativeRefine,
        ];
        keys.extend(CodeMode::ALL.iter().map(|mode| TemplateKey::Code(*mode)));
        keys
    }

    #[test]
    fn test_all_templates_parse() {
        for key in all_keys() {
            assert!(key.template().placeholders().is_ok(), "{:?}", key);
            assert!(key.search_template().placeholders().is_ok(), "{:?}", key);
        }
    }

    #[test]
    fn test_code_templates_share_placeholders() {
        for mode in CodeMode::ALL {
            let names = TemplateKey::Code(mode).template().placeholders().unwrap();
            assert_eq!(names, vec!["language", "code"], "{:?}", mode);
        }
    }

    #[test]
    fn test_article_placeholders() {
        let names = TemplateKey::Article.template().placeholders().unwrap();
        assert_eq!(names, vec!["topic", "word_count", "style", "temperature"]);
    }

    #[test]
    fn test_search_template_appends_guidance() {
        let template = TemplateKey::StudyPlan.search_template();
        assert!(
            template
                .text()
                .ends_with("high-quality learning resources.\n")
        );
        assert_eq!(
            TemplateKey::CvAnalysis.search_template(),
            TemplateKey::CvAnalysis.template()
        );
    }

    #[test]
    fn test_article_guidance_is_a_requirement() {
        let text = TemplateKey::Article.search_template().text().to_string();

        assert!(text.contains(
            "- Include practical examples or case studies where appropriate\n- Incorporate relevant information from the web search results provided\n\nNote: Temperature setting"
        ));
        assert!(text.ends_with("Write the article now:\n"));
        assert_eq!(text.matches("Incorporate relevant information").count(), 1);
    }

    #[test]
    fn test_render_job_match() {
        let fields = TemplateFields::new()
            .with("cv_text", "Rust developer, 5 years")
            .with("job_description", "Backend engineer");
        let rendered = TemplateKey::CvJobMatch.template().render(&fields).unwrap();

        assert!(rendered.contains("Rust developer, 5 years"));
        assert!(rendered.contains("Backend engineer"));
    }

    #[test]
    fn test_code_mode_parsing() {
        assert_eq!("fix".parse::<CodeMode>().unwrap(), CodeMode::FixErrors);
        assert_eq!(
            "Line by line explanation".parse::<CodeMode>().unwrap(),
            CodeMode::LineByLine
        );
        assert_eq!("SOLVE".parse::<CodeMode>().unwrap(), CodeMode::Solve);
        assert!("refactor".parse::<CodeMode>().is_err());
        assert_eq!(CodeMode::Optimize.to_string(), "Optimize code");
    }
}
