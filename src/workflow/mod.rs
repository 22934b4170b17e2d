use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::agent::IterativeChain;
use crate::assistant::{
    ArticleAssistant, CodeAssistant, ConversationMessage, CvAssistant, Feature, FeatureSession,
    StudyAssistant, article, code, cv, study,
};
use crate::config::Config;
use crate::document::extract_cv_text;
use crate::llm::client::{AgentConfig, TextGenerator};
use crate::prompts::CodeMode;

/// 一次命令行调用要执行的任务
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Cv {
        cv_file: PathBuf,
        job_description: Option<String>,
    },
    Code {
        code: String,
        language: String,
        mode: CodeMode,
    },
    Article {
        topic: String,
        word_count: u32,
        style: String,
        temperature: f64,
    },
    Study {
        subject: String,
        duration_weeks: u32,
        experience_level: String,
        goals: String,
    },
    Draft {
        task_description: String,
        input: String,
    },
}

/// 追问输入：逐行读取，空行或EOF结束，读取错误原样交给调用方
fn questions(input: impl BufRead) -> impl Iterator<Item = io::Result<String>> {
    input
        .lines()
        .map(|line| line.map(|line| line.trim().to_string()))
        .take_while(|line| !matches!(line, Ok(line) if line.is_empty()))
}

fn render(output: &mut impl Write, message: &ConversationMessage) -> Result<()> {
    writeln!(output, "\n{}\n", message.content)?;
    if let Some(source) = &message.source {
        writeln!(output, "---\n{}", source)?;
    }
    output.flush()?;
    Ok(())
}

fn announce_follow_ups(output: &mut impl Write) -> Result<()> {
    writeln!(output, "\n💬 Ask follow-up questions (empty line to finish):")?;
    output.flush()?;
    Ok(())
}

/// 运行功能助手，输出回复并在交互模式下处理追问
pub struct Workflow {
    config: Config,
    llm: Arc<dyn TextGenerator>,
}

impl Workflow {
    pub fn new(config: Config, llm: Arc<dyn TextGenerator>) -> Self {
        Self { config, llm }
    }

    /// 执行任务，返回会话历史（草稿任务没有会话，返回None）
    pub async fn run(
        &self,
        task: Task,
        interactive: bool,
        input: impl BufRead,
        output: &mut impl Write,
    ) -> Result<Option<FeatureSession>> {
        let started = Instant::now();
        let session = match task {
            Task::Cv {
                cv_file,
                job_description,
            } => {
                let cv_text = extract_cv_text(&cv_file)?;
                Some(
                    self.run_cv(&cv_text, job_description.as_deref(), interactive, input, output)
                        .await?,
                )
            }
            Task::Code {
                code,
                language,
                mode,
            } => Some(
                self.run_code(&code, &language, mode, interactive, input, output)
                    .await?,
            ),
            Task::Article {
                topic,
                word_count,
                style,
                temperature,
            } => Some(
                self.run_article(&topic, word_count, &style, temperature, interactive, input, output)
                    .await?,
            ),
            Task::Study {
                subject,
                duration_weeks,
                experience_level,
                goals,
            } => Some(
                self.run_study(
                    &subject,
                    duration_weeks,
                    &experience_level,
                    &goals,
                    interactive,
                    input,
                    output,
                )
                .await?,
            ),
            Task::Draft {
                task_description,
                input: draft_input,
            } => {
                self.run_draft(&task_description, &draft_input, interactive, input, output)
                    .await?;
                None
            }
        };

        info!("✅ finished in {:.2}s", started.elapsed().as_secs_f64());
        Ok(session)
    }

    async fn run_cv(
        &self,
        cv_text: &str,
        job_description: Option<&str>,
        interactive: bool,
        input: impl BufRead,
        output: &mut impl Write,
    ) -> Result<FeatureSession> {
        let assistant = CvAssistant::from_config(&self.config, self.llm.clone(), None);
        let mut session = FeatureSession::new(Feature::Cv);

        session.begin_analysis(cv::ANALYSIS_REQUEST);
        let outcome = assistant.analyze(cv_text, job_description).await;
        render(output, session.finish_analysis(outcome))?;

        if !interactive {
            return Ok(session);
        }
        announce_follow_ups(output)?;
        for question in questions(input) {
            let question = question.context("Failed to read follow-up input")?;
            let ready = session.ask(&question);
            let message = if ready {
                let context = session.conversation().assistant_context();
                let outcome = assistant
                    .follow_up(cv_text, job_description, &context, &question)
                    .await;
                session.finish_follow_up(outcome)
            } else {
                session.decline_follow_up()
            };
            render(output, message)?;
        }
        Ok(session)
    }

    async fn run_code(
        &self,
        source: &str,
        language: &str,
        mode: CodeMode,
        interactive: bool,
        input: impl BufRead,
        output: &mut impl Write,
    ) -> Result<FeatureSession> {
        let mut assistant = CodeAssistant::from_config(&self.config, self.llm.clone(), None)?;
        let mut session = FeatureSession::new(Feature::Code);

        session.begin_analysis(&code::analysis_request(mode, language));
        session.attach_code(source);
        let outcome = assistant.analyze(source, language, mode).await;
        render(output, session.finish_analysis(outcome))?;

        if !interactive {
            return Ok(session);
        }
        announce_follow_ups(output)?;
        for question in questions(input) {
            let question = question.context("Failed to read follow-up input")?;
            let ready = session.ask(&question);
            let message = if ready {
                let code_context = session.conversation().first_code().unwrap_or_default().to_string();
                let explanations = session.conversation().assistant_context();
                let outcome = assistant
                    .follow_up(language, &code_context, &explanations, &question)
                    .await;
                session.finish_follow_up(outcome)
            } else {
                session.decline_follow_up()
            };
            render(output, message)?;
        }
        Ok(session)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_article(
        &self,
        topic: &str,
        word_count: u32,
        style: &str,
        temperature: f64,
        interactive: bool,
        input: impl BufRead,
        output: &mut impl Write,
    ) -> Result<FeatureSession> {
        let mut assistant = ArticleAssistant::from_config(&self.config, self.llm.clone(), None)?;
        let mut session = FeatureSession::new(Feature::Article);

        session.begin_analysis(&article::analysis_request(topic, word_count, style, temperature));
        let outcome = assistant.generate(topic, word_count, temperature, style).await;
        render(output, session.finish_analysis(outcome))?;

        if !interactive {
            return Ok(session);
        }
        announce_follow_ups(output)?;
        for request in questions(input) {
            let request = request.context("Failed to read follow-up input")?;
            let ready = session.ask(&request);
            let message = if ready {
                let last = session
                    .conversation()
                    .last_assistant_reply()
                    .unwrap_or_default()
                    .to_string();
                let outcome = assistant.follow_up(topic, &last, &request).await;
                session.finish_follow_up(outcome)
            } else {
                session.decline_follow_up()
            };
            render(output, message)?;
        }
        Ok(session)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_study(
        &self,
        subject: &str,
        duration_weeks: u32,
        experience_level: &str,
        goals: &str,
        interactive: bool,
        input: impl BufRead,
        output: &mut impl Write,
    ) -> Result<FeatureSession> {
        let mut assistant = StudyAssistant::from_config(&self.config, self.llm.clone(), None)?;
        let mut session = FeatureSession::new(Feature::Study);

        session.begin_analysis(&study::analysis_request(
            subject,
            duration_weeks,
            experience_level,
            goals,
        ));
        let outcome = assistant
            .generate(subject, duration_weeks, experience_level, goals)
            .await;
        render(output, session.finish_analysis(outcome))?;

        if !interactive {
            return Ok(session);
        }
        announce_follow_ups(output)?;
        for request in questions(input) {
            let request = request.context("Failed to read follow-up input")?;
            let ready = session.ask(&request);
            let message = if ready {
                let plan = session
                    .conversation()
                    .last_assistant_reply()
                    .unwrap_or_default()
                    .to_string();
                let outcome = assistant
                    .follow_up(subject, duration_weeks, experience_level, &plan, &request)
                    .await;
                session.finish_follow_up(outcome)
            } else {
                session.decline_follow_up()
            };
            render(output, message)?;
        }
        Ok(session)
    }

    async fn run_draft(
        &self,
        task_description: &str,
        draft_input: &str,
        interactive: bool,
        input: impl BufRead,
        output: &mut impl Write,
    ) -> Result<()> {
        let settings = AgentConfig::new(&self.config.llm.model, self.config.llm.temperature);
        let mut chain = IterativeChain::new(task_description, self.llm.clone(), settings);

        let draft = chain.initial_draft(draft_input).await?;
        writeln!(output, "\n{}\n", draft)?;

        if !interactive {
            return Ok(());
        }
        writeln!(output, "\n✏️ Give feedback to refine the draft (empty line to finish):")?;
        for feedback in questions(input) {
            let feedback = feedback.context("Failed to read follow-up input")?;
            match chain.refine(&feedback).await {
                Ok(draft) => writeln!(output, "\n{}\n", draft)?,
                Err(e) => writeln!(output, "\nError generating response: {:#}\n", e)?,
            }
            output.flush()?;
        }
        Ok(())
    }
}
