use gloo::net::http::Request;
use minesweeper_protocol::{
    LeaderboardResponse, MAX_ENTRIES, ScoreRecord, SubmitPreview, SubmitReport, SubmitRequest, Tier, api_path,
    validate_submission,
};
use yew::prelude::*;

async fn read_response(request: Request) -> Result<Vec<ScoreRecord>, String> {
    let response = request.send().await.map_err(|err| {
        log::warn!("Leaderboard request failed: {}", err);
        "network error".to_string()
    })?;
    let body: LeaderboardResponse = response.json().await.map_err(|err| {
        log::warn!("Unreadable leaderboard response: {}", err);
        "unexpected response".to_string()
    })?;
    body.into_result()
}

pub(crate) async fn fetch_list(tier: Tier) -> Result<Vec<ScoreRecord>, String> {
    read_response(Request::get(&api_path(tier)).build().map_err(|err| err.to_string())?).await
}

pub(crate) async fn post_score(tier: Tier, submission: &SubmitRequest) -> Result<Vec<ScoreRecord>, String> {
    let request = Request::post(&api_path(tier))
        .json(submission)
        .map_err(|err| err.to_string())?;
    read_response(request).await
}

/// Result of offering a winning time to the leaderboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SubmitFlow {
    /// Not sent, the user already holds an equal or better time.
    Skipped(SubmitPreview),
    Submitted(SubmitReport),
}

/// Decides what to do with a winning time given the list fetched just before.
///
/// Without a list there is no way to tell a slower time from a first entry, so nothing is posted.
pub(crate) fn plan_submission(
    current: Result<Vec<ScoreRecord>, String>,
    username: &str,
    time: u32,
) -> Result<SubmitPreview, String> {
    let current = current.map_err(|err| {
        log::warn!("Could not check existing entry: {}", err);
        format!("Failed to load the leaderboard ({err}), time not submitted")
    })?;
    Ok(SubmitPreview::evaluate(&current, username, time))
}

/// Compares against the current list first and only posts times that improve on the user's entry.
pub(crate) async fn submit_flow(tier: Tier, username: String, time: u32) -> Result<SubmitFlow, String> {
    validate_submission(&username, time).map_err(|err| err.to_string())?;

    let preview = plan_submission(fetch_list(tier).await, &username, time)?;
    if !preview.should_submit() {
        log::debug!("Not submitting {}s: {:?}", time, preview);
        return Ok(SubmitFlow::Skipped(preview));
    }

    let username = username.trim().to_string();
    let updated = post_score(tier, &SubmitRequest { username: username.clone(), time }).await?;
    Ok(SubmitFlow::Submitted(SubmitReport::new(preview, &updated, &username)))
}

/// Dialog title and body describing a finished submission.
pub(crate) fn flow_message(flow: &SubmitFlow, time: u32) -> (String, String) {
    match *flow {
        SubmitFlow::Skipped(SubmitPreview::Slower { best, delta }) => (
            "Not your best".to_string(),
            format!("This time: {time}s. Your best: {best}s. {delta}s slower, so it was not submitted."),
        ),
        SubmitFlow::Skipped(SubmitPreview::Unchanged { best }) => (
            "Same time".to_string(),
            format!("You already hold {best}s, nothing to submit."),
        ),
        SubmitFlow::Skipped(_) => ("Not submitted".to_string(), String::new()),
        SubmitFlow::Submitted(report) => {
            let detail = match report.preview() {
                SubmitPreview::Improved { previous, delta } => {
                    format!("New personal best: {previous}s → {time}s ({delta}s faster).")
                }
                SubmitPreview::FirstEntry => format!("First time recorded: {time}s."),
                _ => format!("Time recorded: {time}s."),
            };
            match report.rank() {
                Some(rank) => ("On the board!".to_string(), format!("{detail} Rank #{rank}.")),
                None => (
                    "Time recorded".to_string(),
                    format!("{detail} Keep going to reach the top {MAX_ENTRIES}."),
                ),
            }
        }
    }
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct LeaderboardProps {
    pub tier: Tier,
    /// Changes whenever the list should be fetched again.
    #[prop_or_default]
    pub version: u32,
}

pub(crate) enum Msg {
    SelectTier(Tier),
    Loaded(Tier, Result<Vec<ScoreRecord>, String>),
}

pub(crate) struct LeaderboardPanel {
    tier: Tier,
    records: Option<Result<Vec<ScoreRecord>, String>>,
}

impl LeaderboardPanel {
    fn load(&mut self, ctx: &Context<Self>) {
        let tier = self.tier;
        self.records = None;
        ctx.link()
            .send_future(async move { Msg::Loaded(tier, fetch_list(tier).await) });
    }
}

impl Component for LeaderboardPanel {
    type Message = Msg;
    type Properties = LeaderboardProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut panel = Self {
            tier: ctx.props().tier,
            records: None,
        };
        panel.load(ctx);
        panel
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let props = ctx.props();
        if props.tier != old_props.tier {
            self.tier = props.tier;
        }
        self.load(ctx);
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SelectTier(tier) if tier != self.tier => {
                self.tier = tier;
                self.load(ctx);
                true
            }
            Msg::SelectTier(_) => false,
            // a response for a tab that is no longer shown
            Msg::Loaded(tier, _) if tier != self.tier => false,
            Msg::Loaded(_, records) => {
                self.records = Some(records);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let tabs = Tier::ALL.into_iter().map(|tier| {
            let onclick = ctx.link().callback(move |_| Msg::SelectTier(tier));
            let class = classes!((tier == self.tier).then_some("active"));
            html! { <button {class} {onclick}>{tier.label()}</button> }
        });

        let body = match &self.records {
            None => html! { <p>{"Loading…"}</p> },
            Some(Err(_)) => html! { <p class="error">{"Failed to load the leaderboard"}</p> },
            Some(Ok(records)) if records.is_empty() => html! { <p>{"No times yet"}</p> },
            Some(Ok(records)) => html! {
                <ol>
                    {
                        for records.iter().map(|record| html! {
                            <li>
                                <span class="username">{&record.username}</span>
                                <span class="time">{format!("{}s", record.time)}</span>
                            </li>
                        })
                    }
                </ol>
            },
        };

        html! {
            <section class="leaderboard">
                <header>
                    <h3>{"Leaderboard"}</h3>
                    <nav>{for tabs}</nav>
                </header>
                {body}
            </section>
        }
    }
}
