//! Built-in narrative content: the stock event chains, their path rewards,
//! and the faction unrest/rebellion templates.
//!
//! Choice ids double as path signals for [`infer_chain_path`], so peaceful
//! options carry one of `peaceful`, `negotiate`, `cooperate`, `embrace` and
//! aggressive options one of `force`, `control`, `suppress`, `secular`.
//!
//! [`infer_chain_path`]: crate::chain::infer_chain_path

use rust_decimal::Decimal;

use dominion_types::{
    ChainId, ChainReward, Event, EventChoice, EventConsequence, EventSeverity, EventType,
    FactionType, ResourceDelta, ResourceRequirement,
};

use crate::chain::{ChainRewardTable, PathRewards};
use crate::manager::{ChainDefinition, SpawnCondition};

/// Chain id of the noble uprising.
pub const NOBLE_REBELLION: &str = "noble_rebellion";

/// Chain id of the guild quarrel.
pub const MERCHANT_GUILD_DISPUTE: &str = "merchant_guild_dispute";

/// Chain id of the religious revival.
pub const RELIGIOUS_AWAKENING: &str = "religious_awakening";

// ---------------------------------------------------------------------------
// Faction event templates
// ---------------------------------------------------------------------------

/// Text of a faction event. `{faction}` is replaced with the faction name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactionEventTemplate {
    title: &'static str,
    description: &'static str,
}

impl FactionEventTemplate {
    const fn new(title: &'static str, description: &'static str) -> Self {
        Self { title, description }
    }

    /// Headline for `faction`.
    pub fn title(&self, faction: FactionType) -> String {
        self.title.replace("{faction}", faction.name())
    }

    /// Body text for `faction`.
    pub fn description(&self, faction: FactionType) -> String {
        self.description.replace("{faction}", faction.name())
    }
}

/// Critical events for factions at or below their rebellion cutoff.
pub const REBELLION_TEMPLATES: &[FactionEventTemplate] = &[
    FactionEventTemplate::new(
        "Open Revolt",
        "The {faction} have taken up arms against the crown and seized the roads to the capital.",
    ),
    FactionEventTemplate::new(
        "Withdrawal of Allegiance",
        "Leaders of the {faction} publicly renounce their oaths and call on others to follow.",
    ),
    FactionEventTemplate::new(
        "Rival Claimant",
        "The {faction} rally behind a pretender who claims the throne by right.",
    ),
];

/// Severe events for factions at or below their unrest cutoff.
pub const UNREST_TEMPLATES: &[FactionEventTemplate] = &[
    FactionEventTemplate::new(
        "Growing Unrest",
        "Murmurs of dissent spread among the {faction}; petitions pile up at the palace gate.",
    ),
    FactionEventTemplate::new(
        "Refusal to Serve",
        "The {faction} refuse their customary duties until their grievances are heard.",
    ),
    FactionEventTemplate::new(
        "Angry Assembly",
        "A crowd of {faction} gathers in the square demanding an audience with the ruler.",
    ),
];

// ---------------------------------------------------------------------------
// Chains
// ---------------------------------------------------------------------------

/// The stock chain definitions, unlinked.
pub fn builtin_chains() -> Vec<ChainDefinition> {
    vec![noble_rebellion(), merchant_guild_dispute(), religious_awakening()]
}

/// Path rewards for the stock chains.
pub fn builtin_rewards() -> ChainRewardTable {
    let mut table = ChainRewardTable::new();
    table.insert(
        ChainId::from(NOBLE_REBELLION),
        PathRewards {
            peaceful: reward(
                ResourceDelta::default()
                    .with_gold(d(500))
                    .with_influence(d(200))
                    .with_loyalty(d(100)),
                &["noble_council"],
                "The great houses renew their oaths and sit at a new royal council.",
            ),
            aggressive: reward(
                ResourceDelta::default()
                    .with_gold(d(200))
                    .with_military_power(d(150))
                    .with_loyalty(d(-50)),
                &["martial_law"],
                "The rebel lords are broken and their retainers pressed into the royal army.",
            ),
        },
    );
    table.insert(
        ChainId::from(MERCHANT_GUILD_DISPUTE),
        PathRewards {
            peaceful: reward(
                ResourceDelta::default()
                    .with_gold(d(400))
                    .with_influence(d(100))
                    .with_loyalty(d(50)),
                &["trade_charter"],
                "A royal charter settles the guilds' quarrel and trade flourishes.",
            ),
            aggressive: reward(
                ResourceDelta::default()
                    .with_gold(d(600))
                    .with_influence(d(-50))
                    .with_loyalty(d(-30)),
                &["crown_monopoly"],
                "The crown seizes the guild halls and their profits with them.",
            ),
        },
    );
    table.insert(
        ChainId::from(RELIGIOUS_AWAKENING),
        PathRewards {
            peaceful: reward(
                ResourceDelta::default()
                    .with_influence(d(150))
                    .with_loyalty(d(150)),
                &["holy_blessing"],
                "The revival is welcomed into the church and the realm grows devout.",
            ),
            aggressive: reward(
                ResourceDelta::default()
                    .with_gold(d(150))
                    .with_influence(d(100))
                    .with_loyalty(d(-40)),
                &["secular_courts"],
                "Church lands pass to the crown and royal courts take over church law.",
            ),
        },
    );
    table
}

fn d(value: i64) -> Decimal {
    Decimal::from(value)
}

fn reward(resources: ResourceDelta, unlocks: &[&str], description: &str) -> ChainReward {
    ChainReward {
        resources,
        unlocks: unlocks.iter().map(|u| (*u).to_owned()).collect(),
        description: description.to_owned(),
    }
}

fn consequence(description: &str, resources: ResourceDelta, stability: i64) -> EventConsequence {
    EventConsequence::described(description)
        .with_resources(resources)
        .with_stability(d(stability))
}

fn noble_rebellion() -> ChainDefinition {
    let first = Event::new(
        "noble_rebellion_1",
        "Whispers of Rebellion",
        "Spies report that several great houses meet in secret at night.",
        EventType::Political,
        EventSeverity::Moderate,
    )
    .with_choice(EventChoice::new(
        "investigate_peacefully",
        "Send envoys to learn their grievances",
        consequence(
            "The envoys are received coldly but not turned away.",
            ResourceDelta::default().with_influence(d(-5)),
            2,
        ),
    ))
    .with_choice(
        EventChoice::new(
            "show_force",
            "March the guard past their estates",
            consequence(
                "The lords take note of the spears at their gates.",
                ResourceDelta::default().with_gold(d(-20)),
                -3,
            ),
        )
        .with_next_event_modifier("tension", d(2)),
    );

    let second = Event::new(
        "noble_rebellion_2",
        "The Lords' Demands",
        "The houses present a list of demands: lower levies and a voice at court.",
        EventType::Political,
        EventSeverity::Severe,
    )
    .with_choice(
        EventChoice::new(
            "negotiate_compromise",
            "Grant some demands in exchange for renewed oaths",
            consequence(
                "Half the demands are met; the lords grumble but sign.",
                ResourceDelta::default().with_gold(d(-50)),
                3,
            ),
        )
        .requiring(ResourceRequirement {
            gold: d(50),
            ..ResourceRequirement::default()
        }),
    )
    .with_choice(
        EventChoice::new(
            "prepare_suppression",
            "Quietly mobilise the royal levy",
            consequence(
                "Levies muster in the capital.",
                ResourceDelta::default()
                    .with_gold(d(-40))
                    .with_military_power(d(20)),
                -5,
            ),
        )
        .with_long_term(
            EventConsequence::described("Peasants resent the muster.")
                .with_loyalty(d(-10))
                .delayed(3),
        )
        .with_next_event_modifier("tension", d(3)),
    );

    let third = Event::new(
        "noble_rebellion_3",
        "The Reckoning",
        "The lords' banners fly outside the capital. The moment of decision has come.",
        EventType::Military,
        EventSeverity::Critical,
    )
    .with_choice(EventChoice::new(
        "peaceful_resolution",
        "Ride out alone to parley",
        consequence(
            "The lords kneel and the banners are lowered.",
            ResourceDelta::default().with_influence(d(10)),
            5,
        ),
    ))
    .with_choice(EventChoice::new(
        "force_surrender",
        "Storm their camp at dawn",
        consequence(
            "The camp falls; the ringleaders are imprisoned.",
            ResourceDelta::default()
                .with_military_power(d(-10))
                .with_population(d(-15)),
            -5,
        ),
    ));

    ChainDefinition {
        chain_id: ChainId::from(NOBLE_REBELLION),
        events: vec![first, second, third],
        condition: SpawnCondition {
            min_turn: 3,
            max_turn: None,
            min_stability: None,
            max_stability: Some(d(60)),
            min_gold: None,
            min_influence: None,
            probability: 0.15,
            cooldown_turns: 20,
        },
    }
}

fn merchant_guild_dispute() -> ChainDefinition {
    let first = Event::new(
        "merchant_guild_dispute_1",
        "Guild Quarrel",
        "The weavers' and dyers' guilds accuse each other of price fixing.",
        EventType::Economic,
        EventSeverity::Minor,
    )
    .with_choice(EventChoice::new(
        "negotiate_with_guilds",
        "Summon both guild masters to court",
        consequence(
            "The masters agree to talk under royal supervision.",
            ResourceDelta::default().with_influence(d(-5)),
            1,
        ),
    ))
    .with_choice(EventChoice::new(
        "impose_crown_control",
        "Place royal inspectors in both halls",
        consequence(
            "Inspectors arrive with ledgers and seals.",
            ResourceDelta::default().with_gold(d(10)),
            -2,
        ),
    ));

    let second = Event::new(
        "merchant_guild_dispute_2",
        "Tariff Tangle",
        "Foreign traders exploit the quarrel and undercut both guilds.",
        EventType::Economic,
        EventSeverity::Moderate,
    )
    .with_choice(EventChoice::new(
        "cooperate_on_tariffs",
        "Set a common tariff with the guilds",
        consequence(
            "A shared tariff steadies the market.",
            ResourceDelta::default().with_gold(d(30)),
            2,
        ),
    ))
    .with_choice(EventChoice::new(
        "suppress_guild_leaders",
        "Arrest the guild masters for disorder",
        consequence(
            "The halls fall silent and trade stutters.",
            ResourceDelta::default().with_gold(d(-30)),
            -4,
        ),
    ));

    let third = Event::new(
        "merchant_guild_dispute_3",
        "The Market Settles",
        "The guilds await the crown's final word on the future of trade.",
        EventType::Economic,
        EventSeverity::Moderate,
    )
    .with_choice(EventChoice::new(
        "embrace_free_trade",
        "Open the markets to all comers",
        consequence(
            "Caravans return to the capital.",
            ResourceDelta::default().with_gold(d(50)),
            2,
        ),
    ))
    .with_choice(EventChoice::new(
        "force_royal_monopoly",
        "Declare the trade a royal monopoly",
        consequence(
            "The crown's coffers swell at the merchants' expense.",
            ResourceDelta::default().with_gold(d(100)),
            -3,
        ),
    ));

    ChainDefinition {
        chain_id: ChainId::from(MERCHANT_GUILD_DISPUTE),
        events: vec![first, second, third],
        condition: SpawnCondition {
            min_turn: 5,
            max_turn: None,
            min_stability: None,
            max_stability: None,
            min_gold: Some(d(200)),
            min_influence: None,
            probability: 0.1,
            cooldown_turns: 25,
        },
    }
}

fn religious_awakening() -> ChainDefinition {
    let first = Event::new(
        "religious_awakening_1",
        "The Wandering Preacher",
        "A barefoot preacher draws crowds in the market with tales of visions.",
        EventType::Religious,
        EventSeverity::Minor,
    )
    .with_choice(EventChoice::new(
        "embrace_the_movement",
        "Invite the preacher to the royal chapel",
        consequence(
            "The faithful cheer the crown's piety.",
            ResourceDelta::default().with_loyalty(d(5)),
            2,
        ),
    ))
    .with_choice(EventChoice::new(
        "secular_inquiry",
        "Have the royal scholars examine his claims",
        consequence(
            "The scholars publish a dry rebuttal.",
            ResourceDelta::default().with_influence(d(5)),
            -1,
        ),
    ));

    let second = Event::new(
        "religious_awakening_2",
        "Pilgrims at the Gates",
        "Thousands of pilgrims camp outside the walls and strain the granaries.",
        EventType::Social,
        EventSeverity::Moderate,
    )
    .with_choice(EventChoice::new(
        "cooperate_with_clergy",
        "Let the church feed and house them",
        consequence(
            "The bishops take the pilgrims in hand.",
            ResourceDelta::default().with_gold(d(-25)),
            2,
        ),
    ))
    .with_choice(EventChoice::new(
        "control_the_preachers",
        "License every preacher in the realm",
        consequence(
            "Unlicensed sermons are driven underground.",
            ResourceDelta::default().with_influence(d(10)),
            -3,
        ),
    ));

    let third = Event::new(
        "religious_awakening_3",
        "A New Faith or the Old",
        "The movement's leaders ask the crown to recognise them.",
        EventType::Religious,
        EventSeverity::Severe,
    )
    .with_choice(EventChoice::new(
        "peaceful_coexistence",
        "Recognise the movement within the church",
        consequence(
            "Old and new worship side by side.",
            ResourceDelta::default().with_loyalty(d(10)),
            3,
        ),
    ))
    .with_choice(EventChoice::new(
        "secular_decree",
        "Place all religious matters under royal law",
        consequence(
            "Priests of every creed now answer to royal judges.",
            ResourceDelta::default().with_gold(d(40)),
            -4,
        ),
    ));

    ChainDefinition {
        chain_id: ChainId::from(RELIGIOUS_AWAKENING),
        events: vec![first, second, third],
        condition: SpawnCondition {
            min_turn: 8,
            max_turn: None,
            min_stability: Some(d(40)),
            max_stability: None,
            min_gold: None,
            min_influence: Some(d(20)),
            probability: 0.1,
            cooldown_turns: 30,
        },
    }
}
