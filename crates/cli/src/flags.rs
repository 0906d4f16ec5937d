use clap::ValueEnum;
use redress_engine::CombinePolicy;
use redress_protocol::{Bureau, Outcome, Recipient};

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum BureauFlag {
    Tu,
    Ex,
    Eq,
}

impl BureauFlag {
    pub(crate) const fn as_domain(self) -> Bureau {
        match self {
            BureauFlag::Tu => Bureau::TransUnion,
            BureauFlag::Ex => Bureau::Experian,
            BureauFlag::Eq => Bureau::Equifax,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum CombineFlag {
    Combined,
    Individual,
}

impl CombineFlag {
    pub(crate) const fn as_domain(self) -> CombinePolicy {
        match self {
            CombineFlag::Combined => CombinePolicy::Combined,
            CombineFlag::Individual => CombinePolicy::Individual,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum RecipientFlag {
    Bureau,
    Creditor,
    Collector,
}

impl RecipientFlag {
    pub(crate) const fn as_domain(self) -> Recipient {
        match self {
            RecipientFlag::Bureau => Recipient::Bureau,
            RecipientFlag::Creditor => Recipient::Creditor,
            RecipientFlag::Collector => Recipient::Collector,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum OutcomeFlag {
    Deleted,
    Verified,
    Updated,
    NoResponse,
}

impl OutcomeFlag {
    pub(crate) const fn as_domain(self) -> Outcome {
        match self {
            OutcomeFlag::Deleted => Outcome::Deleted,
            OutcomeFlag::Verified => Outcome::Verified,
            OutcomeFlag::Updated => Outcome::Updated,
            OutcomeFlag::NoResponse => Outcome::NoResponse,
        }
    }
}
