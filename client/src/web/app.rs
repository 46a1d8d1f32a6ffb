use leptos::prelude::*;

use landgrid_shared::{LandRecord, normalize_address};

use crate::config::GridConfig;
use crate::web::canvas::LandGridCanvas;
use crate::web::feed::{self, FeedStatus};

/// Newtype wrappers so each signal gets a distinct Leptos context type.
#[derive(Clone, Copy)]
pub(crate) struct LandsSignal(pub RwSignal<Vec<LandRecord>>);
#[derive(Clone, Copy)]
pub(crate) struct WalletAddress(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct SelectedLand(pub RwSignal<Option<u32>>);
#[derive(Clone)]
pub(crate) struct GridSettings(pub GridConfig);

/// Connected wallet, read from `?wallet=0x...` until a wallet adapter lands.
fn wallet_from_query() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params
        .get("wallet")
        .map(|addr| normalize_address(&addr))
        .filter(|addr| !addr.is_empty())
}

fn short_address(addr: &str) -> String {
    if addr.len() <= 12 || !addr.is_ascii() {
        return addr.to_string();
    }
    format!("{}…{}", &addr[..6], &addr[addr.len() - 4..])
}

fn production_label(land: &LandRecord) -> String {
    match land.staked_rate() {
        0 => "Not producing".to_string(),
        rate => format!("Producing {rate}/h"),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let lands: RwSignal<Vec<LandRecord>> = RwSignal::new(Vec::new());
    let wallet = RwSignal::new(wallet_from_query());
    let selected: RwSignal<Option<u32>> = RwSignal::new(None);
    let status = RwSignal::new(FeedStatus::Connecting);

    provide_context(LandsSignal(lands));
    provide_context(WalletAddress(wallet));
    provide_context(SelectedLand(selected));
    provide_context(GridSettings(GridConfig::default()));

    feed::connect(lands, status);
    on_cleanup(feed::disconnect);

    let selected_land = Memo::new(move |_| {
        let id = selected.get()?;
        lands.with(|all| all.iter().find(|land| land.id == id).cloned())
    });

    let status_label = move || match status.get() {
        FeedStatus::Connecting => "connecting",
        FeedStatus::Live => "live",
        FeedStatus::Reconnecting => "reconnecting",
    };

    view! {
        <div style="display: flex; width: 100vw; height: 100vh; background: #0b0d12; color: #e6e6e6; font-family: sans-serif;">
            <div style="flex: 1; min-width: 0;">
                <LandGridCanvas />
            </div>
            <aside style="width: 280px; padding: 16px; border-left: 1px solid #222;">
                <div style="font-size: 12px; opacity: 0.7;">
                    {move || format!("{} lands · {}", lands.with(Vec::len), status_label())}
                </div>
                {move || match selected_land.get() {
                    None => view! { <p>"Select a land tile"</p> }.into_any(),
                    Some(land) => {
                        let owner = land
                            .normalized_owner()
                            .map(|addr| short_address(&addr))
                            .unwrap_or_else(|| "Unclaimed".to_string());
                        let resources = land
                            .resources
                            .iter()
                            .map(|entry| {
                                let staked = if entry.staked { " (staked)" } else { "" };
                                view! { <li>{format!("{:?}: {}/h{}", entry.kind, entry.rate, staked)}</li> }
                            })
                            .collect_view();
                        let output = production_label(&land);
                        view! {
                            <div>
                                <h3>{format!("Land #{}", land.id)}</h3>
                                <p>{owner}</p>
                                <p>{output}</p>
                                <ul>{resources}</ul>
                            </div>
                        }
                        .into_any()
                    }
                }}
            </aside>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use landgrid_shared::{ResourceEntry, ResourceKind};

    use super::*;

    #[test]
    fn short_address_keeps_short_values() {
        assert_eq!(short_address("0xabc"), "0xabc");
    }

    #[test]
    fn short_address_elides_middle() {
        assert_eq!(
            short_address("0x1234567890abcdef1234"),
            "0x1234…1234"
        );
    }

    #[test]
    fn production_label_sums_staked_resources() {
        let mut land = LandRecord::owned_by(4, "0xab");
        assert_eq!(production_label(&land), "Not producing");

        land.resources = vec![
            ResourceEntry {
                kind: ResourceKind::Wood,
                rate: 5,
                staked: true,
            },
            ResourceEntry {
                kind: ResourceKind::Iron,
                rate: 7,
                staked: false,
            },
            ResourceEntry {
                kind: ResourceKind::Gold,
                rate: 2,
                staked: true,
            },
        ];
        assert_eq!(production_label(&land), "Producing 7/h");
    }
}
