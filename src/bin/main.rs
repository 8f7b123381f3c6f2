use std::io::{BufRead, Write};

use artha_advisor::{
    advisor::AdvisoryClient,
    chat::{ChatClient, FALLBACK_REPLY},
    dashboard,
    intake,
    state::{reduce, Action, AppState, Effect},
    models::UserProfile,
};
use tracing::warn;

#[derive(Debug, PartialEq)]
enum SessionEnd {
    Reset,
    Exit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; keep the interactive session quiet by default
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
        eprintln!("⚠️  GEMINI_API_KEY not set in .env");
        eprintln!("📌 Model requests will fail until it is configured");
        String::new()
    });

    let advisor = AdvisoryClient::gemini(api_key.clone());
    let chat = ChatClient::gemini(api_key);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    print_banner(&mut output)?;

    loop {
        let Some(profile) = intake::read_profile(&mut input, &mut output)? else {
            break;
        };

        let end = run_session(&advisor, &chat, profile, &mut input, &mut output).await?;
        if end == SessionEnd::Exit {
            break;
        }
        writeln!(output)?;
    }

    writeln!(
        output,
        "\nNot a SEBI registered entity. For educational purposes only. \
         Investing in stocks involves market risk."
    )?;

    Ok(())
}

fn print_banner<W: Write>(output: &mut W) -> std::io::Result<()> {
    writeln!(output, "════════════════════════════════════════════════")?;
    writeln!(output, "  ArthaAI — AI-Powered Wealth Intelligence")?;
    writeln!(
        output,
        "  Personalized Indian stock picks, grounded in live search."
    )?;
    writeln!(output, "════════════════════════════════════════════════")?;
    writeln!(output)
}

/// One profile session: analyze, render, then the chat loop.
async fn run_session<R: BufRead, W: Write>(
    advisor: &AdvisoryClient,
    chat: &ChatClient,
    profile: UserProfile,
    input: &mut R,
    output: &mut W,
) -> std::io::Result<SessionEnd> {
    let mut state = AppState::default();

    for effect in reduce(&mut state, Action::SubmitProfile(profile.clone())) {
        let Effect::RequestAnalysis(profile) = effect else {
            continue;
        };

        writeln!(output, "\nArthaAI is crunching market data...")?;
        writeln!(output, "Evaluating Nifty 50 trends & risk parameters")?;
        output.flush()?;

        match advisor.analyze(&profile).await {
            Ok(analysis) => {
                reduce(&mut state, Action::AnalysisReady(analysis));
            }
            Err(error) => {
                reduce(&mut state, Action::AnalysisFailed);
                writeln!(output, "\n✖ Analysis failed: {}", error)?;
            }
        }
    }

    let Some(analysis) = state.analysis.clone() else {
        // Failed analysis: back to intake with a fresh session
        writeln!(output, "Let's try again with a profile.\n")?;
        return Ok(SessionEnd::Reset);
    };

    write!(output, "{}", dashboard::render_analysis(&analysis, &profile))?;

    writeln!(output)?;
    writeln!(
        output,
        "I'm ready to discuss your financial goals. Ask about sector trends,"
    )?;
    writeln!(
        output,
        "tax implications, or specific NSE/BSE stocks."
    )?;
    writeln!(output, "Type 'reset' for a new profile, 'exit' to quit.")?;

    loop {
        write!(output, "\nyou> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(SessionEnd::Exit);
        }

        match line.trim() {
            "exit" => return Ok(SessionEnd::Exit),
            "reset" => {
                reduce(&mut state, Action::Reset);
                return Ok(SessionEnd::Reset);
            }
            _ => {}
        }

        // History as it stood before this turn seeds the model call.
        let history = state.transcript.clone();

        for effect in reduce(&mut state, Action::UserMessage(line)) {
            let Effect::SendChat(message) = effect else {
                continue;
            };

            let reply = match chat.send(&message, &history, &profile).await {
                Ok(reply) => reply,
                Err(error) => {
                    warn!("Chat send failed, substituting fallback reply: {}", error);
                    FALLBACK_REPLY.to_string()
                }
            };

            reduce(&mut state, Action::ModelReply(reply));

            if let Some(last) = state.transcript.last() {
                writeln!(output, "\nartha> {}", last.text)?;
            }
        }
    }
}
